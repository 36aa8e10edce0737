#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;

use super::util::*;

// ── truncate ──────────────────────────────────────────────────

#[test]
fn test_truncate_short_string() {
    assert_eq!(truncate("Checking", 10), "Checking");
}

#[test]
fn test_truncate_long_string() {
    assert_eq!(truncate("Groceries at the market", 9), "Groceries…");
}

#[test]
fn test_truncate_zero_max() {
    assert_eq!(truncate("Rent", 0), "");
}

#[test]
fn test_truncate_unicode() {
    assert_eq!(truncate("café résumé", 5), "café…");
}

#[test]
fn test_truncate_one_char() {
    assert_eq!(truncate("Salary", 1), "…");
}

// ── format_number / format_amount ─────────────────────────────

#[test]
fn test_format_number_thousands() {
    assert_eq!(format_number(dec!(1234567.89)), "1,234,567.89");
}

#[test]
fn test_format_number_pads_decimals() {
    assert_eq!(format_number(dec!(5)), "5.00");
    assert_eq!(format_number(dec!(1.5)), "1.50");
}

#[test]
fn test_format_amount_with_currency() {
    assert_eq!(format_amount(dec!(1200), "EUR"), "1,200.00 EUR");
    assert_eq!(format_amount(dec!(-42.50), "USD"), "-42.50 USD");
}

#[test]
fn test_format_amount_without_currency() {
    assert_eq!(format_amount(dec!(-99999.01), ""), "-99,999.01");
}

#[test]
fn test_format_delta_signs() {
    assert_eq!(format_delta(dec!(12.5), "EUR"), "+12.50 EUR");
    assert_eq!(format_delta(dec!(-3), "EUR"), "-3.00 EUR");
    assert_eq!(format_delta(dec!(0), "EUR"), "0.00 EUR");
}

#[test]
fn test_delta_arrow() {
    assert_eq!(delta_arrow(dec!(1)), "▲");
    assert_eq!(delta_arrow(dec!(-0.01)), "▼");
    assert_eq!(delta_arrow(dec!(0)), "=");
}

#[test]
fn test_percent() {
    assert_eq!(percent(dec!(0.5)), "50.0%");
    assert_eq!(percent(dec!(0.3333)), "33.3%");
    assert_eq!(percent(dec!(0)), "0.0%");
}

// ── scrolling ─────────────────────────────────────────────────

#[test]
fn test_scroll_down_follows_cursor() {
    let (mut index, mut scroll) = (0, 0);
    for _ in 0..5 {
        scroll_down(&mut index, &mut scroll, 10, 3);
    }
    assert_eq!(index, 5);
    assert_eq!(scroll, 3);
}

#[test]
fn test_scroll_down_stops_at_end() {
    let (mut index, mut scroll) = (2, 0);
    scroll_down(&mut index, &mut scroll, 3, 10);
    assert_eq!(index, 2);
    assert_eq!(scroll, 0);
}

#[test]
fn test_scroll_up_pulls_scroll_back() {
    let (mut index, mut scroll) = (4, 4);
    scroll_up(&mut index, &mut scroll);
    assert_eq!(index, 3);
    assert_eq!(scroll, 3);
}

#[test]
fn test_scroll_to_bottom_and_top() {
    let (mut index, mut scroll) = (0, 0);
    scroll_to_bottom(&mut index, &mut scroll, 20, 5);
    assert_eq!(index, 19);
    assert_eq!(scroll, 15);
    scroll_to_top(&mut index, &mut scroll);
    assert_eq!((index, scroll), (0, 0));
}

#[test]
fn test_scroll_to_bottom_empty_list() {
    let (mut index, mut scroll) = (0, 0);
    scroll_to_bottom(&mut index, &mut scroll, 0, 5);
    assert_eq!((index, scroll), (0, 0));
}
