//! Report generation: the label/value tree mirroring the decoded service
//! plus a JSON envelope for CLI output.

use serde::Serialize;

use crate::constants::{MIP_PAGE, MOT_PAGE};
use crate::processor::PacketProcessor;
use crate::txt::{Magazine, SubPage, TxtService, mot, x30};

/// One node of the structural tree the original viewer renders.
#[derive(Debug, Clone, Serialize)]
pub struct TreeNode {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn leaf(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self { label: label.into(), value: Some(value.into()), children: Vec::new() }
    }

    pub fn branch(label: impl Into<String>) -> Self {
        Self { label: label.into(), value: None, children: Vec::new() }
    }

    pub fn push(&mut self, child: TreeNode) {
        self.children.push(child);
    }
}

/// JSON structure for one teletext elementary stream.
#[derive(Serialize)]
struct StreamJson {
    pid: u16,
    program: u16,
    languages: Vec<String>,
    pes_packets: u64,
    data_units: u64,
}

/// JSON structure for the complete report.
#[derive(Serialize)]
struct ReportJson {
    ts_time: String,
    streams: Vec<StreamJson>,
    service: TreeNode,
}

/// Report generator for decoded teletext services.
pub struct Reporter;

impl Reporter {
    /// Builds the structural tree for a decoded service.
    pub fn service_tree(svc: &TxtService) -> TreeNode {
        let mut root = TreeNode::branch("teletext service");

        let mut service_packets = TreeNode::branch("service packets");
        for row in [30u8, 31] {
            for designation in 0..16u8 {
                for (line, count) in svc.service_lines(row, designation) {
                    let mut node = TreeNode::leaf(
                        format!("packet 8/{row} designation {designation}"),
                        format!("{count} occurrence(s)"),
                    );
                    if let Some(bsd) = x30::broadcast_service_data(line) {
                        node.push(TreeNode::leaf(
                            "initial page",
                            format!(
                                "{}{:02X} subpage {:04X}",
                                bsd.initial_magazine, bsd.initial_page, bsd.initial_subpage
                            ),
                        ));
                        node.push(TreeNode::leaf("network id", format!("{:04X}", bsd.network_id)));
                        node.push(TreeNode::leaf("status display", bsd.status_display));
                    }
                    if let Some(pdc) = x30::pdc_label(line) {
                        node.push(TreeNode::leaf(
                            "PDC label",
                            format!(
                                "CNI {:02X}{:02X}, {:02}-{:02} {:02}:{:02}",
                                pdc.country, pdc.network, pdc.day, pdc.month, pdc.hour, pdc.minute
                            ),
                        ));
                    }
                    service_packets.push(node);
                }
            }
        }
        if !service_packets.children.is_empty() {
            root.push(service_packets);
        }

        for (no, magazine) in svc.magazines() {
            if magazine.pages().next().is_none() {
                continue;
            }
            root.push(Self::magazine_tree(no, magazine));
        }
        root
    }

    fn magazine_tree(no: u8, magazine: &Magazine) -> TreeNode {
        let display_no = if no == 0 { 8 } else { no };
        let mut node = TreeNode::branch(format!("magazine {display_no}"));

        let mip = magazine.page(MIP_PAGE).and_then(|p| p.first_subpage());
        for (page_no, page) in magazine.pages() {
            let mut page_node = TreeNode::branch(format!("page {display_no}{page_no:02X}"));
            if let Some(mip) = mip
                && let Some(code) = mot::page_function(mip, page_no)
            {
                page_node
                    .push(TreeNode::leaf("MIP function", format!("{code:#04X} {}", mot::page_function_name(code))));
            }
            for sub in page.subpages() {
                page_node.push(Self::subpage_tree(sub, false));
            }
            for sub in page.subtitle_versions() {
                page_node.push(Self::subpage_tree(sub, true));
            }
            if page_no == MOT_PAGE
                && let Some(mot_sub) = page.first_subpage()
            {
                page_node.push(Self::mot_tree(mot_sub));
            }
            node.push(page_node);
        }
        node
    }

    fn subpage_tree(sub: &SubPage, subtitle_version: bool) -> TreeNode {
        let label = if subtitle_version {
            format!("subtitle version, subpage {:04X}", sub.subpage_no())
        } else {
            format!("subpage {:04X}", sub.subpage_no())
        };
        let mut node = TreeNode::branch(label);
        if let Some(header) = sub.header() {
            let flags = header.control_flags();
            node.push(TreeNode::leaf("control flags", format!("{flags:?}")));
            if let Some(pts) = header.pts() {
                node.push(TreeNode::leaf("pts", pts.to_string()));
            }
        }
        let rows = (1..=25u8).filter(|&r| sub.line(r).is_some()).count();
        node.push(TreeNode::leaf("display rows", rows.to_string()));
        for (name, probe) in [
            ("X/26", 26u8),
            ("X/27", 27),
            ("X/28", 28),
        ] {
            let count = (0..16u8)
                .filter(|&d| match probe {
                    26 => sub.x26(d).is_some(),
                    27 => sub.x27(d).is_some(),
                    _ => sub.x28(d).is_some(),
                })
                .count();
            if count > 0 {
                node.push(TreeNode::leaf(name, format!("{count} designation(s)")));
            }
        }
        node
    }

    fn mot_tree(mot_sub: &SubPage) -> TreeNode {
        let mut node = TreeNode::branch("MOT");
        for (label, level35) in [("object links (2.5)", false), ("object links (3.5)", true)] {
            let links = mot::object_links(mot_sub, level35);
            let mut links_node = TreeNode::branch(label);
            for (slot, link) in links.iter().enumerate() {
                if let Some(link) = link {
                    let kind = if slot == 0 { "GPOP".to_string() } else { format!("POP {slot}") };
                    links_node.push(TreeNode::leaf(
                        kind,
                        format!(
                            "magazine {} page {:02X}, {} subpage(s)",
                            link.magazine, link.page, link.subpage_count
                        ),
                    ));
                }
            }
            if !links_node.children.is_empty() {
                node.push(links_node);
            }
        }
        for (label, level35) in [("DRCS links (2.5)", false), ("DRCS links (3.5)", true)] {
            let links = mot::drcs_links(mot_sub, level35);
            let mut links_node = TreeNode::branch(label);
            for (slot, link) in links.iter().enumerate() {
                if let Some(link) = link {
                    let kind = if slot == 0 { "GDRCS".to_string() } else { format!("DRCS {slot}") };
                    links_node.push(TreeNode::leaf(
                        kind,
                        format!(
                            "magazine {} page {:02X}, {} subpage(s)",
                            link.magazine, link.page, link.subpage_count
                        ),
                    ));
                }
            }
            if !links_node.children.is_empty() {
                node.push(links_node);
            }
        }
        if let Some((objects, drcs)) = mot::enhancement_page_counts(mot_sub) {
            node.push(TreeNode::leaf("enhancement pages", format!("{objects} object, {drcs} DRCS")));
        }
        node
    }

    /// Generate pretty-printed JSON for CLI output.
    pub fn generate_json_report(processor: &PacketProcessor) -> String {
        let streams = processor
            .teletext_pids
            .iter()
            .map(|(&pid, stream)| StreamJson {
                pid,
                program: stream.program_number,
                languages: stream.descriptors.iter().map(|d| d.language_str()).collect(),
                pes_packets: stream.pes_packets,
                data_units: stream.data_units,
            })
            .collect();

        let rep = ReportJson {
            ts_time: chrono::Utc::now().to_rfc3339(),
            streams,
            service: Self::service_tree(&processor.service),
        };
        serde_json::to_string_pretty(&rep)
            .unwrap_or_else(|_| "{\"error\": \"JSON serialization failed\"}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DATA_UNIT_TELETEXT;
    use crate::txt::line::testutil::{build_header, build_row};

    #[test]
    fn tree_contains_decoded_pages() {
        let mut svc = TxtService::new();
        svc.add_data_unit(&build_header(DATA_UNIT_TELETEXT, 1, 0x64, 0, false, "P100"), None);
        svc.add_data_unit(&build_row(DATA_UNIT_TELETEXT, 1, 1, "BODY"), None);
        let tree = Reporter::service_tree(&svc);
        let magazine = tree.children.iter().find(|n| n.label == "magazine 1").unwrap();
        let page = magazine.children.iter().find(|n| n.label == "page 164").unwrap();
        let sub = page.children.iter().find(|n| n.label.starts_with("subpage")).unwrap();
        let rows = sub.children.iter().find(|n| n.label == "display rows").unwrap();
        assert_eq!(rows.value.as_deref(), Some("1"));
    }

    #[test]
    fn tree_serializes_to_json() {
        let svc = TxtService::new();
        let tree = Reporter::service_tree(&svc);
        let json = serde_json::to_string(&tree).unwrap();
        assert!(json.contains("teletext service"));
    }
}
