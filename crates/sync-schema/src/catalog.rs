//! Known configuration nodes
//!
//! [`KNOWN_NODES`] is the closed vocabulary of top-level node names. The
//! extractor uses it to filter candidates and the augmenter uses it to fill
//! gaps, so both always agree on what a node is.

use crate::model::{NodeDescriptor, PropertyDescriptor};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Catalog entry for a known top-level node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownNode {
    /// Node name
    pub name: &'static str,
    /// Baseline description
    pub description: &'static str,
    /// Baseline property names
    pub properties: &'static [&'static str],
}

impl KnownNode {
    /// Baseline descriptor with every property typed `"unknown"`
    #[must_use]
    pub fn descriptor(&self) -> NodeDescriptor {
        self.properties.iter().fold(
            NodeDescriptor::new().with_description(self.description),
            |node, prop| node.with_property(*prop, PropertyDescriptor::unknown()),
        )
    }
}

/// Every node name the configuration format knows about
pub static KNOWN_NODES: &[KnownNode] = &[
    KnownNode {
        name: "agents",
        description: "Agent defaults and per-agent definitions",
        properties: &["defaults", "list"],
    },
    KnownNode {
        name: "audio",
        description: "Audio transcription settings",
        properties: &["transcription"],
    },
    KnownNode {
        name: "auth",
        description: "Authentication profiles and provider order",
        properties: &["profiles", "order"],
    },
    KnownNode {
        name: "bindings",
        description: "Routing bindings between channels and agents",
        properties: &["agentId", "match"],
    },
    KnownNode {
        name: "browser",
        description: "Managed browser control",
        properties: &["enabled", "controlUrl", "headless", "profiles"],
    },
    KnownNode {
        name: "channels",
        description: "Messaging channel integrations",
        properties: &["whatsapp", "telegram", "discord", "slack", "signal"],
    },
    KnownNode {
        name: "commands",
        description: "Chat command handling",
        properties: &["native", "text", "restart"],
    },
    KnownNode {
        name: "cron",
        description: "Scheduled job runner",
        properties: &["enabled", "store", "maxConcurrentRuns"],
    },
    KnownNode {
        name: "diagnostics",
        description: "Diagnostic flags and reporting",
        properties: &["enabled", "flags"],
    },
    KnownNode {
        name: "gateway",
        description: "Gateway server settings",
        properties: &["port", "mode", "bind", "auth", "controlUi", "reload"],
    },
    KnownNode {
        name: "hooks",
        description: "Inbound webhook handling",
        properties: &["enabled", "path", "token", "mappings"],
    },
    KnownNode {
        name: "logging",
        description: "Log levels, files and redaction",
        properties: &["level", "file", "consoleLevel", "consoleStyle", "redactSensitive"],
    },
    KnownNode {
        name: "messages",
        description: "Message formatting and queueing",
        properties: &["responsePrefix", "ackReaction", "queue", "inbound"],
    },
    KnownNode {
        name: "meta",
        description: "Bookkeeping written by the application",
        properties: &["lastTouchedVersion", "lastTouchedAt"],
    },
    KnownNode {
        name: "models",
        description: "Model providers and catalog merging",
        properties: &["mode", "providers"],
    },
    KnownNode {
        name: "plugins",
        description: "Plugin loading and allow lists",
        properties: &["enabled", "allow", "deny", "load", "entries"],
    },
    KnownNode {
        name: "session",
        description: "Conversation session scoping and reset",
        properties: &["scope", "dmScope", "reset", "store", "mainKey"],
    },
    KnownNode {
        name: "skills",
        description: "Skill loading and installation",
        properties: &["allowBundled", "load", "install", "entries"],
    },
    KnownNode {
        name: "talk",
        description: "Voice conversation settings",
        properties: &["voiceId", "modelId", "outputFormat", "interruptOnSpeech"],
    },
    KnownNode {
        name: "tools",
        description: "Tool profiles and policies",
        properties: &["profile", "allow", "deny", "exec", "web"],
    },
    KnownNode {
        name: "update",
        description: "Update channel and checks",
        properties: &["channel", "checkOnStart"],
    },
    KnownNode {
        name: "web",
        description: "Web channel connection settings",
        properties: &["enabled", "heartbeatSeconds", "reconnect"],
    },
];

static INDEX: Lazy<HashMap<&'static str, &'static KnownNode>> =
    Lazy::new(|| KNOWN_NODES.iter().map(|node| (node.name, node)).collect());

/// Look up a known node by name
#[inline]
#[must_use]
pub fn known_node(name: &str) -> Option<&'static KnownNode> {
    INDEX.get(name).copied()
}

/// Whether `name` is in the node vocabulary
#[inline]
#[must_use]
pub fn is_known_node(name: &str) -> bool {
    INDEX.contains_key(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UNKNOWN_TYPE;

    #[test]
    fn vocabulary_is_closed() {
        assert!(is_known_node("gateway"));
        assert!(is_known_node("agents"));
        assert!(!is_known_node("Gateway"));
        assert!(!is_known_node("properties"));
        assert!(!is_known_node(""));
    }

    #[test]
    fn names_are_unique() {
        assert_eq!(INDEX.len(), KNOWN_NODES.len());
    }

    #[test]
    fn descriptor_lists_catalog_properties() {
        let node = known_node("gateway").unwrap().descriptor();

        assert_eq!(node.description.as_deref(), Some("Gateway server settings"));
        assert!(node.properties.contains_key("port"));
        assert!(node.properties.values().all(|p| p.kind == UNKNOWN_TYPE));
        assert!(node.raw.is_none());
    }
}
