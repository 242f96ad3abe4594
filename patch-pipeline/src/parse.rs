//! Extraction of structured payloads from free-form model completions.
//!
//! Two sentinel contracts are understood:
//! - `<root>...</root>` blocks holding the file/search-term query:
//!   ```text
//!   <root>
//!       <entry>
//!           <filepath>repo/pkg/mod.py</filepath>
//!           <strings_to_search>
//!               <string_to_search>def calculate(</string_to_search>
//!           </strings_to_search>
//!       </entry>
//!   </root>
//!   ```
//! - `<patch>...</patch>` blocks holding a candidate diff.
//!
//! Query blocks are parsed independently. A malformed block contributes nothing
//! and is recorded in [`QueryParse::errors`]; [`QueryParse::into_request`] then
//! yields an empty request for the whole response.

use lazy_static::lazy_static;
use quick_xml::Reader;
use quick_xml::events::Event;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};

use crate::query::SearchRequest;

lazy_static! {
    static ref ROOT_BLOCK: Regex = Regex::new(r"(?s)<root>(.*?)</root>").unwrap();
    static ref PATCH_BLOCK: Regex = Regex::new(r"(?s)<patch>(.*?)</patch>").unwrap();
}

/// Why one `<root>` block was dropped.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("query block #{block}: {reason}")]
pub struct QueryError {
    /// 1-based index of the block within the response.
    pub block: usize,
    pub reason: String,
}

/// Outcome of parsing every `<root>` block of one response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParse {
    /// Entries from the blocks that parsed cleanly.
    pub entries: SearchRequest,
    /// One error per block that did not.
    pub errors: Vec<QueryError>,
}

impl QueryParse {
    /// The usable request: empty as soon as any block failed to parse.
    pub fn into_request(self) -> SearchRequest {
        if self.errors.is_empty() {
            self.entries
        } else {
            SearchRequest::new()
        }
    }
}

/// Parses all `<root>` blocks of `text` into a [`QueryParse`].
pub fn parse_search_request(text: &str) -> QueryParse {
    let mut out = QueryParse::default();

    for (i, cap) in ROOT_BLOCK.captures_iter(text).enumerate() {
        let block = i + 1;
        let body = cap.get(1).map_or("", |m| m.as_str());
        let wrapped = format!("<root>{body}</root>");

        match parse_element(&wrapped).and_then(|root| entries_of(&root)) {
            Ok(req) => {
                debug!(block, entries = req.len(), "query block parsed");
                out.entries.extend(req);
            }
            Err(reason) => {
                warn!(block, %reason, "query block is malformed");
                out.errors.push(QueryError { block, reason });
            }
        }
    }
    out
}

/// Concatenates the bodies of all `<patch>` blocks with `\n`.
///
/// Returns `None` when the text holds no complete patch block.
pub fn extract_patch(text: &str) -> Option<String> {
    let bodies: Vec<&str> = PATCH_BLOCK
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .collect();
    if bodies.is_empty() {
        None
    } else {
        Some(bodies.join("\n"))
    }
}

/* ==========================
Minimal element tree
========================== */

/// Element with the text that precedes its first child, attributes dropped.
#[derive(Debug, Default)]
struct Node {
    name: String,
    text: Option<String>,
    children: Vec<Node>,
}

impl Node {
    fn named(name: &[u8]) -> Self {
        Self {
            name: String::from_utf8_lossy(name).into_owned(),
            ..Default::default()
        }
    }

    fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }
}

fn entries_of(root: &Node) -> Result<SearchRequest, String> {
    let mut req = SearchRequest::new();
    for entry in root.children_named("entry") {
        let path = match entry.child("filepath") {
            Some(fp) => match fp.text.as_deref() {
                Some(t) => Some(t.trim().to_string()),
                None => return Err("<filepath> has no text".into()),
            },
            None => None,
        };

        let terms = entry
            .child("strings_to_search")
            .map(|c| {
                c.children_named("string_to_search")
                    .filter_map(|s| s.text.as_deref())
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        req.insert(path, terms);
    }
    Ok(req)
}

/// Parses a single well-formed element into a [`Node`] tree.
fn parse_element(xml: &str) -> Result<Node, String> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<Node> = None;

    loop {
        let event = match reader.read_event() {
            Ok(ev) => ev,
            Err(e) => return Err(format!("{e} at byte {}", reader.buffer_position())),
        };
        match event {
            Event::Start(e) => {
                if root.is_some() {
                    return Err("junk after document element".into());
                }
                stack.push(Node::named(e.name().as_ref()));
            }
            Event::Empty(e) => {
                let node = Node::named(e.name().as_ref());
                close(node, &mut stack, &mut root)?;
            }
            Event::End(e) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| "closing tag without opening tag".to_string())?;
                if node.name.as_bytes() != e.name().as_ref() {
                    return Err(format!(
                        "mismatched tag: expected </{}>, found </{}>",
                        node.name,
                        String::from_utf8_lossy(e.name().as_ref())
                    ));
                }
                close(node, &mut stack, &mut root)?;
            }
            Event::Text(t) => {
                let text = t.unescape().map_err(|e| e.to_string())?;
                push_text(&mut stack, &text)?;
            }
            Event::CData(c) => push_text(&mut stack, &String::from_utf8_lossy(&c))?,
            Event::Eof => break,
            // comments, processing instructions, declarations
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(format!("unclosed element <{}>", open.name));
    }
    root.ok_or_else(|| "no element found".to_string())
}

fn close(node: Node, stack: &mut [Node], root: &mut Option<Node>) -> Result<(), String> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(node);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(node);
            Ok(())
        }
        None => Err("junk after document element".into()),
    }
}

fn push_text(stack: &mut [Node], text: &str) -> Result<(), String> {
    match stack.last_mut() {
        Some(top) => {
            // Text after a child element is that child's tail, not ours.
            if top.children.is_empty() {
                top.text.get_or_insert_with(String::new).push_str(text);
            }
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err("text outside the document element".into()),
    }
}
