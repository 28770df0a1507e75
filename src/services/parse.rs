//! Parsing of adapter command output
//!
//! Understands PowerShell `Get-NetAdapter` output (plain status words and
//! `ConvertTo-Json` listings) and iproute2 one-line `ip -o link show` output.

use serde::Deserialize;

use crate::state::AdapterState;

/// One adapter from a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedAdapter {
    pub name: String,
    pub description: String,
    pub state: AdapterState,
}

impl ListedAdapter {
    /// Case-insensitive substring match against name or description
    pub fn matches(&self, pattern: &str) -> bool {
        let pattern = pattern.to_lowercase();
        self.name.to_lowercase().contains(&pattern)
            || self.description.to_lowercase().contains(&pattern)
    }
}

/// Parse the output of a status query
///
/// Administrative state is what matters: a Windows adapter that is
/// `Disconnected` is still enabled, and a Linux link is enabled when the
/// `UP` flag is set whether or not it has carrier.
pub fn parse_status(output: &str) -> Option<AdapterState> {
    let text = output.trim();
    if let Some(flags) = link_flags(text) {
        return Some(state_from_flags(flags));
    }
    state_from_status_word(text.lines().next()?.trim())
}

fn state_from_status_word(word: &str) -> Option<AdapterState> {
    match word.to_lowercase().as_str() {
        "disabled" => Some(AdapterState::Disabled),
        "up" | "disconnected" | "dormant" | "lowerlayerdown" | "testing" => {
            Some(AdapterState::Enabled)
        }
        _ => None,
    }
}

/// The comma separated flag list between `<` and `>`
fn link_flags(line: &str) -> Option<&str> {
    let start = line.find('<')?;
    let end = start + line[start..].find('>')?;
    Some(&line[start + 1..end])
}

fn state_from_flags(flags: &str) -> AdapterState {
    if flags.split(',').any(|flag| flag.trim() == "UP") {
        AdapterState::Enabled
    } else {
        AdapterState::Disabled
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct NetAdapterJson {
    name: String,
    #[serde(default)]
    interface_description: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NetAdapterListing {
    Many(Vec<NetAdapterJson>),
    One(NetAdapterJson),
}

/// Parse an adapter listing, in either PowerShell JSON or `ip -o link` form
pub fn parse_listing(output: &str) -> Vec<ListedAdapter> {
    let text = output.trim();
    if text.is_empty() {
        return Vec::new();
    }
    if text.starts_with('[') || text.starts_with('{') {
        return parse_json_listing(text);
    }
    text.lines().filter_map(parse_link_line).collect()
}

fn parse_json_listing(text: &str) -> Vec<ListedAdapter> {
    let adapters = match serde_json::from_str::<NetAdapterListing>(text) {
        Ok(NetAdapterListing::Many(adapters)) => adapters,
        Ok(NetAdapterListing::One(adapter)) => vec![adapter],
        Err(e) => {
            tracing::warn!("Could not parse adapter listing: {}", e);
            return Vec::new();
        }
    };

    adapters
        .into_iter()
        .map(|adapter| ListedAdapter {
            state: adapter
                .status
                .as_deref()
                .and_then(state_from_status_word)
                .unwrap_or_default(),
            name: adapter.name,
            description: adapter.interface_description.unwrap_or_default(),
        })
        .collect()
}

/// `2: eth0: <BROADCAST,MULTICAST,UP,LOWER_UP> mtu 1500 ...`
fn parse_link_line(line: &str) -> Option<ListedAdapter> {
    let mut parts = line.splitn(3, ": ");
    let _index = parts.next()?;
    let name = parts.next()?.trim();
    let rest = parts.next()?;
    // VLAN and veth links are printed as `name@parent`
    let name = name.split('@').next().unwrap_or(name);
    if name == "lo" {
        return None;
    }
    Some(ListedAdapter {
        name: name.to_string(),
        description: String::new(),
        state: link_flags(rest).map(state_from_flags).unwrap_or_default(),
    })
}
