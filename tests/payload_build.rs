use intellihunt_client::payload::{AppRow, OsRow, ReportForm, SourceRow, build, split_list};

fn os(vendor: &str, product: &str) -> OsRow {
    OsRow {
        vendor: vendor.into(),
        product: product.into(),
    }
}

#[test]
fn blank_os_rows_are_dropped() {
    let payload = build(
        &[os("", ""), os("Microsoft", ""), os("  ", "\t"), os("", "Ubuntu")],
        &[],
        &[],
    );
    assert_eq!(payload.os, vec![os("Microsoft", ""), os("", "Ubuntu")]);
}

#[test]
fn list_text_splits_on_commas_and_newlines() {
    assert_eq!(split_list("A, B,, C\nD"), vec!["A", "B", "C", "D"]);
    assert_eq!(split_list(" , \n "), Vec::<String>::new());
    // Order kept, no dedup.
    assert_eq!(split_list("Office, Office"), vec!["Office", "Office"]);
}

#[test]
fn application_rows_keep_vendor_or_products() {
    let apps = vec![
        AppRow {
            vendor: "".into(),
            products: vec!["".into(), " ".into()],
        },
        AppRow::from_text("", "Chrome"),
        AppRow {
            vendor: "Acme".into(),
            products: vec!["".into(), "Widget".into()],
        },
        AppRow::from_text("Microsoft", ""),
    ];
    let payload = build(&[], &apps, &[]);
    assert_eq!(
        payload.applications,
        vec![
            AppRow::from_text("", "Chrome"),
            AppRow::from_text("Acme", "Widget"),
            AppRow::from_text("Microsoft", ""),
        ]
    );
}

#[test]
fn source_rows_need_any_attribute() {
    let sources = vec![
        SourceRow::from_text("", "", ""),
        SourceRow::from_text("", "", "firewall logs"),
        SourceRow::from_text("EDR", "host, pid", ""),
        SourceRow::from_text("", "src_ip", ""),
    ];
    let payload = build(&[], &[], &sources);
    assert_eq!(payload.sources.len(), 3);
    assert_eq!(payload.sources[1].fields, vec!["host", "pid"]);
}

#[test]
fn example_form_builds_expected_payload() {
    let raw = include_str!("../report-form.example.toml");
    let form: ReportForm = toml::from_str(raw).expect("parse form TOML");
    let payload = form.build();

    assert_eq!(payload.os.len(), 2);
    assert_eq!(
        payload.applications[0].products,
        vec!["SharePoint", "Office", "PowerPoint"]
    );
    assert_eq!(payload.applications[1].products, vec!["HTTP Server", "Tomcat"]);
    assert_eq!(payload.sources.len(), 1);
    assert_eq!(payload.sources[0].fields, vec!["src_ip", "dst_ip", "user"]);
}

#[test]
fn payload_serializes_to_submission_shape() {
    let payload = build(
        &[os("Microsoft", "Windows 11")],
        &[AppRow::from_text("Microsoft", "Office\nTeams")],
        &[SourceRow::from_text("SIEM", "user", "logs")],
    );
    let json = serde_json::to_value(&payload).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "os": [{"vendor": "Microsoft", "product": "Windows 11"}],
            "applications": [{"vendor": "Microsoft", "products": ["Office", "Teams"]}],
            "sources": [{"name": "SIEM", "fields": ["user"], "description": "logs"}],
        })
    );
}
