//! Inline button payloads.
//!
//! Entity ids travel inside the callback data as `<action>_<id>`, e.g.
//! `category_3`, `add_to_cart_17`, `admin_confirm_42`.

use std::fmt;
use std::str::FromStr;
use crate::StorefrontError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallbackAction {
    Category(i64),
    Subcategory(i64),
    Product(i64),
    Variant(i64),
    AddToCart(i64),
    Remove(i64),
    ViewCart,
    ClearCart,
    Checkout,
    SkipNote,
    BackToCategories,
    AdminConfirm(i64),
    AdminReject(i64),
}

// Longer prefixes first so `subcategory_` is not read as `category_`.
const PREFIXED: [(&str, fn(i64) -> CallbackAction); 8] = [
    ("add_to_cart_", CallbackAction::AddToCart),
    ("admin_confirm_", CallbackAction::AdminConfirm),
    ("admin_reject_", CallbackAction::AdminReject),
    ("subcategory_", CallbackAction::Subcategory),
    ("category_", CallbackAction::Category),
    ("product_", CallbackAction::Product),
    ("variant_", CallbackAction::Variant),
    ("remove_", CallbackAction::Remove),
];

impl CallbackAction {
    pub fn encode(&self) -> String { self.to_string() }
}

impl fmt::Display for CallbackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Category(id) => write!(f, "category_{id}"),
            Self::Subcategory(id) => write!(f, "subcategory_{id}"),
            Self::Product(id) => write!(f, "product_{id}"),
            Self::Variant(id) => write!(f, "variant_{id}"),
            Self::AddToCart(id) => write!(f, "add_to_cart_{id}"),
            Self::Remove(id) => write!(f, "remove_{id}"),
            Self::ViewCart => f.write_str("view_cart"),
            Self::ClearCart => f.write_str("clear_cart"),
            Self::Checkout => f.write_str("checkout"),
            Self::SkipNote => f.write_str("skip_note"),
            Self::BackToCategories => f.write_str("back_to_categories"),
            Self::AdminConfirm(id) => write!(f, "admin_confirm_{id}"),
            Self::AdminReject(id) => write!(f, "admin_reject_{id}"),
        }
    }
}

impl FromStr for CallbackAction {
    type Err = StorefrontError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let invalid = || StorefrontError::InvalidCallback(data.to_string());
        match data {
            "view_cart" => return Ok(Self::ViewCart),
            "clear_cart" => return Ok(Self::ClearCart),
            "checkout" => return Ok(Self::Checkout),
            "skip_note" => return Ok(Self::SkipNote),
            "back_to_categories" => return Ok(Self::BackToCategories),
            _ => {}
        }
        let (build, id) = PREFIXED
            .iter()
            .find_map(|(prefix, build)| data.strip_prefix(prefix).map(|id| (build, id)))
            .ok_or_else(invalid)?;
        match id.parse::<i64>() {
            Ok(id) if id > 0 => Ok(build(id)),
            _ => Err(invalid()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let actions = [
            CallbackAction::Category(3), CallbackAction::Subcategory(4), CallbackAction::Product(5),
            CallbackAction::Variant(6), CallbackAction::AddToCart(7), CallbackAction::Remove(8),
            CallbackAction::ViewCart, CallbackAction::ClearCart, CallbackAction::Checkout,
            CallbackAction::SkipNote, CallbackAction::BackToCategories,
            CallbackAction::AdminConfirm(42), CallbackAction::AdminReject(43),
        ];
        for action in actions {
            assert_eq!(action.encode().parse::<CallbackAction>().unwrap(), action);
        }
    }

    #[test]
    fn test_wire_format() {
        assert_eq!(CallbackAction::AddToCart(17).encode(), "add_to_cart_17");
        assert_eq!("subcategory_2".parse::<CallbackAction>().unwrap(), CallbackAction::Subcategory(2));
        assert_eq!("category_2".parse::<CallbackAction>().unwrap(), CallbackAction::Category(2));
    }

    #[test]
    fn test_malformed_rejected() {
        for data in ["", "category_", "category_x", "product_-1", "variant_0", "admin_confirm", "nope_1"] {
            assert!(matches!(data.parse::<CallbackAction>(), Err(StorefrontError::InvalidCallback(_))), "{data}");
        }
    }
}
