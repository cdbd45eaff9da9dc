use std::fmt;

use ego_tree::NodeRef;
use scraper::{ElementRef, Html, Node};

// Display-ready pieces of a job description. The vocabulary is deliberately
// small: bold spans, explicit line breaks and bullet lists survive, every
// other node kind is either descended through or dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Text(String),
    Bold(String),
    Break,
    Bullets(Vec<String>),
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fragment::Text(text) => f.write_str(text),
            Fragment::Bold(text) => write!(f, "<b>{}</b>", text),
            Fragment::Break => f.write_str("<br/>"),
            Fragment::Bullets(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str("\n")?;
                    }
                    write!(f, "\u{2022} {}", item)?;
                }
                Ok(())
            }
        }
    }
}

pub fn fragments(html: &str) -> Vec<Fragment> {
    let document = Html::parse_fragment(html);
    let mut out = Vec::new();
    walk(*document.root_element(), &mut out);
    out
}

pub fn normalize(html: &str) -> String {
    fragments(html)
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn walk(node: NodeRef<'_, Node>, out: &mut Vec<Fragment>) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    out.push(Fragment::Text(trimmed.to_string()));
                }
            }
            Node::Element(element) => match element.name() {
                // Recognized containers consume their whole subtree.
                "b" | "strong" => {
                    let text = subtree_text(child);
                    if !text.is_empty() {
                        out.push(Fragment::Bold(text));
                    }
                }
                "br" => out.push(Fragment::Break),
                "ul" => {
                    let items: Vec<String> = child
                        .children()
                        .filter(|n| matches!(n.value(), Node::Element(e) if e.name() == "li"))
                        .map(subtree_text)
                        .filter(|text| !text.is_empty())
                        .collect();
                    if !items.is_empty() {
                        out.push(Fragment::Bullets(items));
                    }
                }
                _ => walk(child, out),
            },
            _ => {}
        }
    }
}

fn subtree_text(node: NodeRef<'_, Node>) -> String {
    match ElementRef::wrap(node) {
        Some(element) => element
            .text()
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" "),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bold_break_and_bullets_round_trip() {
        let input = "<b>Remote</b><br/><ul><li>Python</li><li>SQL</li></ul>";
        assert_eq!(
            normalize(input),
            "<b>Remote</b>\n\n<br/>\n\n\u{2022} Python\n\u{2022} SQL"
        );
    }

    #[test]
    fn normalize_is_deterministic() {
        let input = "<p>We hire <b>fast</b>.<br/>Apply now.</p>";
        assert_eq!(normalize(input), normalize(input));
    }

    #[test]
    fn unrecognized_nodes_yield_empty_output() {
        assert_eq!(normalize("<div><img src=\"logo.png\"/></div>"), "");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn plain_text_is_trimmed() {
        assert_eq!(normalize("   hello world   "), "hello world");
    }

    #[test]
    fn unknown_elements_are_transparent() {
        let input = "<div><p>alpha</p><p><b>beta</b></p></div>";
        assert_eq!(normalize(input), "alpha\n\n<b>beta</b>");
    }

    #[test]
    fn list_items_collapse_nested_markup() {
        let input = "<ul><li><span>5+ years</span> Rust</li></ul>";
        assert_eq!(normalize(input), "\u{2022} 5+ years Rust");
    }

    #[test]
    fn empty_list_is_dropped() {
        assert_eq!(normalize("<ul>   </ul>"), "");
    }
}
