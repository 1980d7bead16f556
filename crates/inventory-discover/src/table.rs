//! Fixed-width text rendering of the inventory report.

use crate::report::InventoryRow;

const RULE_WIDTH: usize = 135;
const PLACEHOLDER: &str = "-";

fn push_line(out: &mut String, cols: [&str; 8]) {
    out.push_str(&format!(
        "{:20}{:15}{:15}{:15}{:15}{:20}{:20}{:20}",
        cols[0], cols[1], cols[2], cols[3], cols[4], cols[5], cols[6], cols[7]
    ));
    out.push('\n');
}

/// Render the header, a dash rule, and one line per row.
pub fn render_table(rows: &[InventoryRow]) -> String {
    let mut out = String::new();
    push_line(
        &mut out,
        [
            "Hostname",
            "Status",
            "Model",
            "Software",
            "Architecture",
            "IP Address",
            "MAC Address",
            "Serial Number",
        ],
    );
    out.push_str(&"-".repeat(RULE_WIDTH));
    out.push('\n');

    for row in rows {
        let status = row.status().to_string();
        match &row.snapshot {
            Ok(s) => push_line(
                &mut out,
                [
                    &s.hostname,
                    &status,
                    &s.model,
                    &s.software_version,
                    &s.architecture,
                    &s.management_ip,
                    &s.mac_address,
                    &s.serial_number,
                ],
            ),
            Err(_) => {
                let address = row.address.to_string();
                push_line(
                    &mut out,
                    [
                        PLACEHOLDER,
                        &status,
                        PLACEHOLDER,
                        PLACEHOLDER,
                        PLACEHOLDER,
                        &address,
                        PLACEHOLDER,
                        PLACEHOLDER,
                    ],
                )
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use inventory_core::DeviceSnapshot;

    use super::*;
    use crate::report::ReportError;

    fn ok_row() -> InventoryRow {
        InventoryRow {
            address: Ipv4Addr::new(192, 168, 56, 11),
            snapshot: Ok(DeviceSnapshot {
                hostname: "leaf1".into(),
                model: "vEOS".into(),
                software_version: "4.28.3M".into(),
                architecture: "i686".into(),
                mac_address: "50:00:00:d7:ee:0b".into(),
                serial_number: "SN-0001".into(),
                management_ip: "192.168.56.11".into(),
            }),
        }
    }

    #[test]
    fn test_header_and_rule() {
        let table = render_table(&[]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Hostname            Status         Model"));
        assert_eq!(lines[1], "-".repeat(135));
    }

    #[test]
    fn test_every_line_is_newline_terminated() {
        let table = render_table(&[ok_row(), ok_row()]);
        assert!(table.ends_with('\n'));
        assert_eq!(table.matches('\n').count(), 4);
        assert!(!table.contains("\n\n"));
    }

    #[test]
    fn test_columns_are_fixed_width() {
        let table = render_table(&[ok_row()]);
        let row = table.lines().nth(2).unwrap();
        assert_eq!(&row[..20], format!("{:20}", "leaf1"));
        assert_eq!(&row[20..35], format!("{:15}", "OK"));
        assert_eq!(&row[35..50], format!("{:15}", "vEOS"));
        assert_eq!(&row[80..100], format!("{:20}", "192.168.56.11"));
        assert_eq!(row.len(), 140);
    }

    #[test]
    fn test_error_row_shows_scanned_address() {
        let row = InventoryRow {
            address: Ipv4Addr::new(10, 0, 0, 9),
            snapshot: Err(ReportError::Task("boom".into())),
        };
        let table = render_table(&[row]);
        let line = table.lines().nth(2).unwrap();
        assert!(line.starts_with(&format!("{:20}{:15}", "-", "ERROR")));
        assert!(line.contains("10.0.0.9"));
    }
}
