use std::collections::HashMap;
use supplymon::core::devices::{
    DeviceDescriptor, DeviceKind, MfpSpec, PagesRemainingSpec, TonerSpec,
};
use supplymon::core::extract::Locator;
use supplymon::core::mail::Notifier;
use supplymon::core::{EmailOutcome, SupplyMonitor};

use super::common::{read_log, supplies_page, temp_log, FakeSource, RecordingNotifier};

const MFP_URL: &str = "http://mfp.local/hp/device/info_suppliesStatus.html";
const TONER_URL: &str = "http://m402.local/";
const PAGES_URL: &str = "http://m404.local/";

fn mfp(drop_last_supply: bool) -> DeviceDescriptor {
    let model_numbers: HashMap<String, String> = [
        ("Black", "CE400X"),
        ("Cyan", "CE401A"),
        ("Magenta", "CE403A"),
        ("Yellow", "CE402A"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    DeviceDescriptor {
        name: "MFP".to_string(),
        kind: DeviceKind::Mfp(MfpSpec {
            url: MFP_URL.to_string(),
            toner_threshold: 10,
            waste_toner_model: "B5L37A".to_string(),
            model: Some("HP M570dn".to_string()),
            model_numbers,
            exclude_supplies: None,
            drop_last_supply,
        }),
    }
}

fn toner(threshold: u32) -> DeviceDescriptor {
    DeviceDescriptor {
        name: "M402".to_string(),
        kind: DeviceKind::Toner(TonerSpec {
            url: TONER_URL.to_string(),
            xpath: r#"//*[@id="SupplyPLR0"]"#.to_string(),
            threshold,
            model: "CF226X".to_string(),
        }),
    }
}

fn pages(threshold: u32) -> DeviceDescriptor {
    DeviceDescriptor {
        name: "M404dn".to_string(),
        kind: DeviceKind::PagesRemaining(PagesRemainingSpec {
            url: PAGES_URL.to_string(),
            threshold,
            model: "CF258A".to_string(),
            selector: None,
        }),
    }
}

#[test]
fn test_mfp_legacy_last_row_dropped() {
    let (_dir, log) = temp_log();
    let page = supplies_page(
        &[
            ("Black Cartridge", "70%*"),
            ("Cyan Cartridge", "5%*"),
            ("Magenta Cartridge", "3%*"),
        ],
        "Normal",
        false,
    );
    let source = FakeSource::default().with_html(MFP_URL, page);
    let notifier = RecordingNotifier::default();

    let monitor = SupplyMonitor::new(&source, &log);
    let summary = monitor.run(&[mfp(true)], Some(&notifier as &dyn Notifier), "Order");

    assert!(matches!(summary.email, EmailOutcome::Sent(_)));
    let sent = notifier.sent.borrow();
    assert_eq!(sent.len(), 1);

    let body = &sent[0].1;
    assert!(body.contains("MFP Cyan Cartridge (CE401A): 5%"));
    assert!(!body.contains("Magenta"));
    assert!(!body.contains("Black Cartridge"));
    assert!(!body.contains("Toner Collection Unit"));

    let content = read_log(&log);
    assert!(content.contains("MFP Black Cartridge: 70"));
    assert!(content.contains("MFP Waste Toner is normal"));
}

#[test]
fn test_mfp_collection_unit_row_excluded_by_label() {
    let (_dir, log) = temp_log();
    let page = supplies_page(
        &[
            ("Black Cartridge", "70%*"),
            ("Cyan Cartridge", "5%*"),
            ("Magenta Cartridge", "3%*"),
        ],
        "Replace Soon",
        true,
    );
    let source = FakeSource::default().with_html(MFP_URL, page);

    let monitor = SupplyMonitor::new(&source, &log);
    let summary = monitor.run(&[mfp(false)], None, "Order");

    assert_eq!(summary.email, EmailOutcome::DryRun);
    let body = summary.report.body();
    assert!(body.contains("MFP Toner Collection Unit Status: Replace Soon\nOrder B5L37A for HP M570dn\n"));
    assert!(body.contains("MFP Cyan Cartridge (CE401A): 5%"));
    assert!(body.contains("MFP Magenta Cartridge (CE403A): 3%"));
    assert!(!body.contains("Black Cartridge"));

    // Waste toner comes before the cartridges
    let waste = body.find("Toner Collection Unit Status").unwrap();
    let cyan = body.find("Cyan Cartridge").unwrap();
    assert!(waste < cyan);
}

#[test]
fn test_all_healthy_sends_nothing() {
    let (_dir, log) = temp_log();
    let page = supplies_page(&[("Black Cartridge", "80%*")], "Normal", true);
    let source = FakeSource::default()
        .with_html(MFP_URL, page)
        .with_rendered(TONER_URL, Some("60%"))
        .with_rendered(PAGES_URL, Some("2400"));
    let notifier = RecordingNotifier::default();

    let monitor = SupplyMonitor::new(&source, &log);
    let summary = monitor.run(
        &[pages(500), toner(10), mfp(false)],
        Some(&notifier as &dyn Notifier),
        "Order",
    );

    assert_eq!(summary.email, EmailOutcome::NotNeeded);
    assert_eq!(summary.failed_devices, 0);
    assert!(notifier.sent.borrow().is_empty());

    let content = read_log(&log);
    assert!(content.contains("Supply monitor started."));
    assert!(content.contains("no email sent"));
    assert!(content.contains("Supply monitor completed."));
    assert!(!content.contains("send email"));
}

#[test]
fn test_unreachable_device_does_not_stop_others() {
    let (_dir, log) = temp_log();
    // No page for the MFP: its fetch fails like an unreachable host
    let source = FakeSource::default().with_rendered(TONER_URL, Some("8%"));
    let notifier = RecordingNotifier::default();

    let monitor = SupplyMonitor::new(&source, &log);
    let summary = monitor.run(
        &[mfp(false), toner(10)],
        Some(&notifier as &dyn Notifier),
        "Order",
    );

    assert_eq!(summary.devices, 2);
    assert_eq!(summary.failed_devices, 1);
    assert!(matches!(summary.email, EmailOutcome::Sent(_)));

    let sent = notifier.sent.borrow();
    let body = &sent[0].1;
    assert!(body.starts_with("Order Printer Supplies:\n\n"));
    assert!(body.contains("MFP Error: "));
    assert!(body.contains("M402 Black toner percentage: 8%\nOrder CF226X\n"));

    // Configured order is kept in the report
    assert!(body.find("MFP Error").unwrap() < body.find("M402 Black").unwrap());
    assert!(read_log(&log).contains("send email"));
}

#[test]
fn test_pages_threshold_boundary() {
    let (_dir, log) = temp_log();
    let source = FakeSource::default().with_rendered(PAGES_URL, Some("500"));

    let monitor = SupplyMonitor::new(&source, &log);
    let summary = monitor.run(&[pages(500)], None, "Order");
    assert_eq!(summary.email, EmailOutcome::NotNeeded);

    let source = FakeSource::default().with_rendered(PAGES_URL, Some("499"));
    let monitor = SupplyMonitor::new(&source, &log);
    let summary = monitor.run(&[pages(500)], None, "Order");
    assert!(summary
        .report
        .body()
        .contains("M404dn Approximate Pages Remaining: 499\nOrder CF258A\n"));
}

#[test]
fn test_pages_element_missing_is_device_error() {
    let (_dir, log) = temp_log();
    let source = FakeSource::default().with_rendered(PAGES_URL, None);

    let monitor = SupplyMonitor::new(&source, &log);
    let summary = monitor.run(&[pages(500)], None, "Order");

    assert_eq!(summary.failed_devices, 1);
    assert!(summary.report.body().contains("M404dn Error: "));
}

#[test]
fn test_toner_missing_element_is_soft() {
    let (_dir, log) = temp_log();
    let source = FakeSource::default().with_rendered(TONER_URL, None);

    let monitor = SupplyMonitor::new(&source, &log);
    let summary = monitor.run(&[toner(10)], None, "Order");

    assert_eq!(summary.failed_devices, 0);
    assert_eq!(summary.email, EmailOutcome::NotNeeded);
    assert!(read_log(&log).contains("M402 Unable to determine the black toner percentage."));

    let calls = source.rendered_calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].1,
        Locator::XPath(r#"//*[@id="SupplyPLR0"]"#.to_string())
    );
}

#[test]
fn test_unreadable_cartridge_reaches_report() {
    let (_dir, log) = temp_log();
    let page = supplies_page(
        &[("Black Cartridge", "70%*"), ("Cyan Cartridge", "--%")],
        "Normal",
        true,
    );
    let source = FakeSource::default().with_html(MFP_URL, page);
    let notifier = RecordingNotifier::default();

    let monitor = SupplyMonitor::new(&source, &log);
    let summary = monitor.run(&[mfp(false)], Some(&notifier as &dyn Notifier), "Order");

    assert!(matches!(summary.email, EmailOutcome::Sent(_)));
    let sent = notifier.sent.borrow();
    let body = &sent[0].1;
    assert!(body.contains("MFP Cyan Cartridge (CE401A): level unknown\n"));
    assert!(!body.contains("0%"));
    assert!(!body.contains("Order CE401A"));
    assert!(!body.contains("Black Cartridge"));
}
