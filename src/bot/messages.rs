//! User-facing texts.

use std::fmt::Write;
use crate::db::orders::{OrderDetails, OrderStats};
use crate::domain::{Cart, Money, Order, OrderStatus, Product, Variant};

pub const WELCOME: &str = "👋 Welcome to our store!\n\nTo get started, please share your phone number with the button below or type it manually.\n\nExample: +1234567890";
pub const WELCOME_BACK: &str = "👋 Welcome back!\n\nUse /order to browse the catalog or /cart to see your cart.";
pub const PHONE_REGISTERED: &str = "✅ Thank you! Your phone number has been registered.\n\nYou can now browse our products with /order.";
pub const INVALID_PHONE: &str = "❌ Invalid phone number format.\n\nPlease send a valid phone number (e.g., +1234567890)";
pub const FOREIGN_CONTACT: &str = "❌ Please share your own contact.";
pub const NOT_REGISTERED: &str = "Please use /start first to register!";
pub const SELECT_CATEGORY: &str = "🛍 Please select a category:";
pub const SELECT_PRODUCT: &str = "📦 Please select a product:";
pub const NO_CATEGORIES: &str = "❌ No categories available at the moment.\n\nPlease try again later.";
pub const NO_PRODUCTS: &str = "❌ No products available in this category.";
pub const NO_VARIANTS: &str = "❌ No variants available for this product.";
pub const OUT_OF_STOCK: &str = "Not enough stock!";
pub const NOT_AVAILABLE: &str = "This item is no longer available.";
pub const CART_EMPTY: &str = "🛒 Your cart is empty.\n\nStart shopping with /order!";
pub const CART_CLEARED: &str = "🗑 Your cart has been cleared.";
pub const ASK_NOTE: &str = "📝 Would you like to add a note or comment for this order?\n\nType it now, or press Skip (/skip).";
pub const ASK_LOCATION: &str = "📍 Please share the delivery location.\n\nTap the button below to share your location.";
pub const LOCATION_EXPECTED: &str = "📍 Please share your location using the button below, or /cancel to stop.";
pub const CHECKOUT_CANCELLED: &str = "Checkout cancelled. Your cart is kept; use /cart to return to it.";
pub const NOTHING_TO_SKIP: &str = "There is nothing to skip right now.";
pub const NO_ORDERS: &str = "📦 You haven't placed any orders yet.";
pub const NO_PENDING: &str = "✅ No pending orders.";
pub const UNAUTHORIZED: &str = "Unauthorized";
pub const UNKNOWN_INPUT: &str = "I didn't get that. Use /order to shop, /cart to see your cart or /help for help.";
pub const GENERIC_ERROR: &str = "⚠️ Something went wrong. Please try again later.";

pub fn help(is_admin: bool) -> String {
    let mut text = String::from(
        "ℹ️ How to order:\n\n\
         1. /start - register your phone number\n\
         2. /order - pick a category, product and variant\n\
         3. /cart - review your cart and press Checkout\n\
         4. Add a note, share your location and we'll take it from there\n\n\
         /orders - your recent orders\n\
         /cancel - abort the checkout",
    );
    if is_admin {
        text.push_str("\n\n🔐 Admin:\n/admin - admin panel\n/stats - store statistics\n/pending - orders awaiting a decision");
    }
    text
}

/// `$1,299.99` for dollars, `1,299.99 UZS` for other currencies.
pub fn format_price(money: &Money) -> String {
    let minor = money.minor_units();
    let sign = if minor < 0 { "-" } else { "" };
    let minor = minor.unsigned_abs();
    let amount = format!("{}.{:02}", group_thousands(minor / 100), minor % 100);
    match money.currency() {
        "USD" => format!("{sign}${amount}"),
        "EUR" => format!("{sign}€{amount}"),
        "GBP" => format!("{sign}£{amount}"),
        other => format!("{sign}{amount} {other}"),
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 { out.push(','); }
        out.push(c);
    }
    out
}

pub fn status_emoji(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => "⏳",
        OrderStatus::Confirmed => "✅",
        OrderStatus::Cancelled => "❌",
        OrderStatus::Delivered => "📦",
    }
}

pub fn category_header(name: &str) -> String { format!("📦 {name}\n\n{SELECT_PRODUCT}") }

pub fn product_text(product: &Product) -> String {
    let mut text = format!("🛍️ {}\n", product.name);
    if let Some(description) = product.description.as_deref().filter(|d| !d.is_empty()) {
        let _ = write!(text, "\n{description}\n");
    }
    text.push_str("\nChoose a variant:");
    text
}

pub fn variant_label(variant: &Variant, currency: &str) -> String {
    let stock = variant.stock().value();
    let suffix = match stock {
        0 => " (sold out)".to_string(),
        1..=9 => format!(" ({stock} left)"),
        _ => String::new(),
    };
    format!("✨ {} - {}{}", variant.name, format_price(&variant.price(currency)), suffix)
}

pub fn variant_text(product: &Product, variant: &Variant, currency: &str) -> String {
    let mut text = format!("{}\n{}\n", product.name, variant.name);
    if let Some(description) = variant.description.as_deref().filter(|d| !d.is_empty()) {
        let _ = writeln!(text, "\n{description}");
    }
    let _ = write!(text, "\n💰 Price: {}\n📦 In stock: {}", format_price(&variant.price(currency)), variant.stock());
    text
}

pub fn added_to_cart(quantity: u32) -> String { format!("✅ Added to cart! ({quantity} in cart)") }

pub fn cart_text(cart: &Cart) -> String {
    if cart.is_empty() { return CART_EMPTY.to_string(); }
    let mut text = String::from("🛒 Your Cart:\n\n");
    for line in cart.items() {
        let _ = write!(
            text,
            "{}\n  Variant: {}\n  {} x {} = {}\n",
            line.product_name, line.variant_name, format_price(&line.unit_price), line.quantity, format_price(&line.line_total()),
        );
        if !line.available {
            text.push_str("  ⚠️ no longer available\n");
        }
        text.push('\n');
    }
    let _ = write!(text, "━━━━━━━━━━━━━━━━━━\n💰 Total: {}", format_price(&cart.total()));
    text
}

pub fn order_sent(order: &Order, currency: &str) -> String {
    format!(
        "✅ Your order has been sent to the administrator!\n\nOrder ID: #{}\nTotal: {}\nStatus: Pending confirmation\n\nWe'll notify you once it's confirmed.",
        order.id, format_price(&order.total(currency)),
    )
}

pub fn order_confirmed(order_id: i64) -> String {
    format!("🎉 Your order has been confirmed!\n\nOrder ID: #{order_id}\n\nWe're preparing your delivery.")
}

pub fn order_rejected(order_id: i64) -> String {
    format!("❌ Sorry, your order has been rejected.\n\nOrder ID: #{order_id}\n\nPlease contact support for more information.")
}

/// Full order card used for admins, the channel and order history.
pub fn order_summary(details: &OrderDetails, currency: &str) -> String {
    let OrderDetails { order, items, customer } = details;
    let mut text = format!("📦 Order #{}\n\n👤 Customer:\n  Name: {}\n  Phone: {}\n", order.id, customer.full_name(), customer.phone_number);
    if let Some(username) = &customer.username {
        let _ = writeln!(text, "  Username: @{username}");
    }
    text.push_str("\n🛍 Items:\n");
    for item in items {
        let _ = writeln!(
            text,
            "  • {} - {}\n    {} x {} = {}",
            item.product_name, item.variant_name,
            format_price(&Money::from_minor(item.unit_price, currency)), item.quantity, format_price(&item.line_total(currency)),
        );
    }
    let _ = write!(text, "\n💰 Total: {}\n", format_price(&order.total(currency)));
    if let Some(note) = &order.note {
        let _ = write!(text, "\n📝 Note: {note}\n");
    }
    text.push_str("\n📍 Delivery Location:\n");
    if let Some(address) = &order.address {
        let _ = writeln!(text, "  {address}");
    }
    let _ = write!(
        text,
        "  Coordinates: {}, {}\n\n🕐 Order Time: {}\n📊 Status: {}",
        order.latitude, order.longitude, order.created_at.format("%Y-%m-%d %H:%M:%S"), order.status.as_str().to_uppercase(),
    );
    text
}

pub fn new_order_alert(details: &OrderDetails, currency: &str) -> String {
    format!("🆕 NEW ORDER\n\n{}", order_summary(details, currency))
}

pub fn decision_stamp(status: OrderStatus, admin_name: &str) -> String {
    format!("{} {} by {}", status_emoji(status), status.as_str().to_uppercase(), admin_name)
}

pub fn already_decided(order_id: i64, status: OrderStatus) -> String {
    format!("Order #{order_id} is already {status}.")
}

pub fn stats_text(stats: &OrderStats, currency: &str) -> String {
    format!(
        "📊 Store statistics\n\n👥 Customers: {}\n🧾 Orders: {}\n  ⏳ Pending: {}\n  ✅ Confirmed: {}\n  📦 Delivered: {}\n  ❌ Cancelled: {}\n\n💰 Revenue: {}",
        stats.customers, stats.total_orders, stats.pending, stats.confirmed, stats.delivered, stats.cancelled,
        format_price(&Money::from_minor(stats.revenue, currency)),
    )
}

pub fn admin_panel(stats: &OrderStats) -> String {
    format!(
        "🔐 Admin panel\n\n⏳ Pending orders: {}\n\n/pending - review pending orders\n/stats - store statistics",
        stats.pending,
    )
}

pub fn order_line(order: &Order, currency: &str) -> String {
    format!(
        "{} #{} - {} - {} ({})",
        status_emoji(order.status), order.id, format_price(&order.total(currency)), order.created_at.format("%Y-%m-%d %H:%M"), order.status,
    )
}

pub fn withdrawn(product: &str) -> String {
    format!("❌ {product} is no longer available. Remove it from your /cart to continue.")
}

pub fn stock_short(product: &str, available: u32) -> String {
    match available {
        0 => format!("❌ {product} is sold out."),
        n => format!("❌ Not enough stock for {product}: only {n} left."),
    }
}

pub fn orders_header(count: usize) -> String { format!("📦 Your Orders ({count})\n\nHere's your order history:") }

pub fn more_orders(hidden: usize) -> String { format!("... and {hidden} more orders") }

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CartLine, CartLineRow};

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(&Money::from_minor(129_999, "USD")), "$1,299.99");
        assert_eq!(format_price(&Money::from_minor(5, "USD")), "$0.05");
        assert_eq!(format_price(&Money::from_minor(123_456_700, "UZS")), "1,234,567.00 UZS");
        assert_eq!(format_price(&Money::from_minor(-1_000, "EUR")), "-€10.00");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(12_345_678), "12,345,678");
    }

    #[test]
    fn test_cart_text_flags_withdrawn_lines() {
        let row = |variant_id, available| CartLineRow {
            variant_id, product_name: "Pizza".into(), variant_name: format!("V{variant_id}"), unit_price: 1_500, quantity: 2, stock: 5, available,
        };
        let cart = Cart::with_lines(1, "USD", [row(1, true), row(2, false)].map(|r| CartLine::from_row(r, "USD")));
        let text = cart_text(&cart);
        assert_eq!(text.matches("no longer available").count(), 1);
        assert!(text.contains("Variant: V2\n  $15.00 x 2 = $30.00\n  ⚠️ no longer available\n\n"));
        assert!(text.ends_with("💰 Total: $60.00"));
    }

    #[test]
    fn test_help_mentions_admin_only_for_admins() {
        assert!(help(true).contains("/pending"));
        assert!(!help(false).contains("/pending"));
        assert!(help(true).contains("/start - register your phone number"));
        assert!(!help(true).contains('\u{2014}'));
    }
}
