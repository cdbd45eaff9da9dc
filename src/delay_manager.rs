use std::time::Duration;
use std::thread;
use rand::Rng;
use log::info;

// Search pages and detail views render asynchronously with no completion
// signal, so reads happen after a bounded randomized sleep.

pub fn random_page_delay() {
    let mut rng = rand::thread_rng();
    let delay_secs = rng.gen_range(3..=7);
    info!("Waiting for {} seconds (Page Delay)...", delay_secs);
    thread::sleep(Duration::from_secs(delay_secs));
}

pub fn random_detail_delay() {
    let mut rng = rand::thread_rng();
    let delay_secs = rng.gen_range(5..=11);
    info!("Waiting for {} seconds (Detail Delay)...", delay_secs);
    thread::sleep(Duration::from_secs(delay_secs));
}
