use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::Local;
use env_logger::{Builder, Target};
use log::LevelFilter;

// The log file is scoped to one pipeline run: it is truncated on init and
// its name is chosen by the run entry point, not at process startup.
pub fn init<P: AsRef<Path>>(log_path: P) -> std::io::Result<()> {
    let file = File::create(log_path.as_ref())?;

    Builder::new()
        .format(|buf, record| {
            writeln!(buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, LevelFilter::Info)
        .target(Target::Pipe(Box::new(file)))
        .init();

    log::info!("Logger initialized.");
    Ok(())
}
