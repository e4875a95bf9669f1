//! Node definition extraction
//!
//! Finds `name: {` openers for known node names and walks the block with a
//! brace-depth scanner. Braces inside double-quoted strings do not count,
//! and a block that never closes runs to the end of the text.

use once_cell::sync::Lazy;
use regex::Regex;
use sync_schema::{is_known_node, NodeDescriptor, PropertyDescriptor, SchemaDocument};

/// Characters kept from a node block for auditing
pub const RAW_EXCERPT_CHARS: usize = 500;

/// Quoted or bare identifier followed by `:` and an opening brace
static NODE_OPENER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?:"(\w+)"|\b(\w+))\s*:\s*\{"#).expect("node opener pattern is valid"));

/// Quoted or bare key followed by `:`
static CHILD_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:"([\w-]+)"|\b([A-Za-z_]\w*))\s*:"#).expect("child key pattern is valid")
});

/// Brace depth and string state at a byte position
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ScanState {
    depth: usize,
    in_string: bool,
    escaped: bool,
}

impl ScanState {
    fn step(&mut self, byte: u8) {
        if self.in_string {
            if self.escaped {
                self.escaped = false;
            } else if byte == b'\\' {
                self.escaped = true;
            } else if byte == b'"' {
                self.in_string = false;
            }
            return;
        }
        match byte {
            b'"' => self.in_string = true,
            b'{' => self.depth += 1,
            b'}' => self.depth = self.depth.saturating_sub(1),
            _ => {}
        }
    }
}

/// Extract every known node defined in `text`
///
/// Unknown identifiers are skipped, but scanning continues inside their
/// blocks so a known node wrapped in an unknown one is still found. Known
/// nodes nested inside another known node's block are part of that block.
/// When a node is defined twice, the later definition wins.
#[must_use]
pub fn extract_node_definitions(text: &str) -> SchemaDocument {
    let mut nodes = SchemaDocument::new();
    let mut pos = 0;

    while let Some(caps) = NODE_OPENER.captures_at(text, pos) {
        let Some(opener) = caps.get(0) else { break };
        let name = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());

        if !is_known_node(name) {
            pos = opener.end();
            continue;
        }

        let open = opener.end() - 1;
        let end = block_end(text, open);
        let node = describe_block(&text[open..end], &text[opener.start()..end]);

        if nodes.insert(name, node).is_some() {
            tracing::debug!("node '{}' defined more than once in one chunk, keeping the later", name);
        }
        pos = end;
    }

    nodes
}

/// Exclusive end of the brace block opening at `open`
fn block_end(text: &str, open: usize) -> usize {
    let mut state = ScanState::default();
    for (offset, &byte) in text.as_bytes()[open..].iter().enumerate() {
        let closing = !state.in_string && byte == b'}';
        state.step(byte);
        if closing && state.depth == 0 {
            return open + offset + 1;
        }
    }
    text.len()
}

fn describe_block(block: &str, excerpt_source: &str) -> NodeDescriptor {
    let mut node = NodeDescriptor::new().with_raw(excerpt_source.chars().take(RAW_EXCERPT_CHARS).collect::<String>());
    for key in child_keys(block) {
        node.properties
            .entry(key.to_string())
            .or_insert_with(PropertyDescriptor::unknown);
    }
    node
}

/// Keys declared directly inside `block` (which starts at its opening brace)
fn child_keys(block: &str) -> Vec<&str> {
    let mut states = Vec::with_capacity(block.len());
    let mut state = ScanState::default();
    for &byte in block.as_bytes() {
        states.push(state);
        state.step(byte);
    }

    CHILD_KEY
        .captures_iter(block)
        .filter_map(|caps| {
            let start = caps.get(0)?.start();
            let at = states.get(start)?;
            if at.depth == 1 && !at.in_string {
                caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str())
            } else {
                None
            }
        })
        .collect()
}
