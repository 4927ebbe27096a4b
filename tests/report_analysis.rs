use intellihunt_client::analysis::{
    DISPLAY_FORMAT, TimestampSource, extract_cve_ids, filter_ids, infer_timestamp,
    infer_timestamp_detailed, nvd_url, summarize,
};

#[test]
fn duplicate_ids_collapse() {
    assert_eq!(
        extract_cve_ids("See CVE-2021-34527 and CVE-2021-34527 again"),
        vec!["CVE-2021-34527"]
    );
}

#[test]
fn lowercase_prefix_does_not_match() {
    assert_eq!(
        extract_cve_ids("cve-2021-1 is lowercase, CVE-2020-99999 is valid"),
        vec!["CVE-2020-99999"]
    );
    assert!(extract_cve_ids("cve-2021-44228").is_empty());
}

#[test]
fn ids_sorted_by_string_order() {
    let text = "CVE-2023-2000 then CVE-2021-10000, CVE-2021-2000 and CVE-2019-0708";
    let ids = extract_cve_ids(text);
    assert_eq!(
        ids,
        vec!["CVE-2019-0708", "CVE-2021-10000", "CVE-2021-2000", "CVE-2023-2000"]
    );
    assert_eq!(extract_cve_ids(&ids.join("\n")), ids);
}

#[test]
fn ids_respect_word_boundaries_and_digit_limits() {
    let text = "XCVE-2021-1234 CVE-2021-123 CVE-2021-12345678 (CVE-2022-1234567)";
    assert_eq!(extract_cve_ids(text), vec!["CVE-2022-1234567"]);
}

#[test]
fn labeled_timestamp_is_captured() {
    assert_eq!(
        infer_timestamp("Report saved: 2024-01-02 10:00:00"),
        "2024-01-02 10:00:00"
    );
    assert_eq!(
        infer_timestamp("# Weekly\n\nLast Updated: 2024/03/05\n\n## Findings"),
        "2024/03/05"
    );
    let lower = infer_timestamp_detailed("generated: 2023-05-06");
    assert_eq!(lower.value, "2023-05-06");
    assert_eq!(lower.source, TimestampSource::Labeled);
}

#[test]
fn label_takes_precedence_over_bare_timestamp() {
    let text = "Window 2022-01-01 00:00:00\nLast Updated: yesterday";
    assert_eq!(infer_timestamp(text), "yesterday");
}

#[test]
fn bare_timestamp_is_second_choice() {
    let ts = infer_timestamp_detailed("Run at 2023-11-30T08:15:00 UTC by the crew");
    assert_eq!(ts.value, "2023-11-30T08:15:00");
    assert_eq!(ts.source, TimestampSource::Iso);
    assert!(ts.is_authoritative());

    // 1999 is outside the accepted range.
    let old = infer_timestamp_detailed("Run at 1999-11-30 08:15:00 UTC");
    assert_eq!(old.source, TimestampSource::WallClock);
}

#[test]
fn wall_clock_fallback_is_parseable() {
    let ts = infer_timestamp_detailed("no dates in this report");
    assert_eq!(ts.source, TimestampSource::WallClock);
    assert!(!ts.is_authoritative());
    assert!(time::PrimitiveDateTime::parse(&ts.value, DISPLAY_FORMAT).is_ok());
}

#[test]
fn filter_is_case_insensitive_substring() {
    let ids = extract_cve_ids("CVE-2021-34527 CVE-2020-1472 CVE-2021-44228");
    let hits: Vec<&str> = filter_ids(&ids, " cve-2021 ").into_iter().map(String::as_str).collect();
    assert_eq!(hits, vec!["CVE-2021-34527", "CVE-2021-44228"]);
    assert_eq!(filter_ids(&ids, "").len(), 3);
    assert!(filter_ids(&ids, "2019").is_empty());
}

#[test]
fn summary_counts_distinct_ids() {
    let md = "# Report\nGenerated: 2024-06-01 09:30:00\n\n- CVE-2024-3094\n- CVE-2024-3094\n- CVE-2023-4863\n";
    let summary = summarize(md);
    assert_eq!(summary.cve_count, 2);
    assert_eq!(summary.last_updated.value, "2024-06-01 09:30:00");
    assert_eq!(
        nvd_url(&summary.cve_ids[0]),
        "https://nvd.nist.gov/vuln/detail/CVE-2023-4863"
    );
}

#[test]
fn non_ascii_neighbours_delimit_ids() {
    let text = "voirCVE-2021-44228 | CVE-2021-44228é | 漏洞CVE-2022-22965";
    assert_eq!(extract_cve_ids(text), vec!["CVE-2021-44228", "CVE-2022-22965"]);
}

#[test]
fn non_ascii_neighbours_do_not_truncate_timestamps() {
    assert_eq!(infer_timestamp("Generated: 2024-01-02é"), "2024-01-02");

    let bare = infer_timestamp_detailed("更新2024-02-03 04:05:06完了");
    assert_eq!(bare.value, "2024-02-03 04:05:06");
    assert_eq!(bare.source, TimestampSource::Iso);
}
