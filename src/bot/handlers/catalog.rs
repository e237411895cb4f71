//! Catalog navigation: categories → subcategories → products → variants.

use crate::bot::callback::CallbackAction;
use crate::bot::handlers::{Ctx, HandlerResult};
use crate::bot::messages;
use crate::bot::outgoing::{Button, Keyboard, Origin, Outgoing, Reaction, Target};
use crate::db::catalog;
use crate::domain::{Category, Product};
use crate::{Result, StorefrontError};

fn back(action: CallbackAction) -> Vec<Button> { vec![Button::new("⬅️ Back", action)] }

async fn active_category(ctx: Ctx<'_>, id: i64) -> Result<Category> {
    let category = catalog::get_category(&ctx.app.db, id).await?;
    if !category.is_active { return Err(StorefrontError::not_found("category", id)); }
    Ok(category)
}

async fn active_product(ctx: Ctx<'_>, id: i64) -> Result<Product> {
    let product = catalog::get_product(&ctx.app.db, id).await?;
    if !product.is_active { return Err(StorefrontError::not_found("product", id)); }
    Ok(product)
}

pub async fn categories(ctx: Ctx<'_>, origin: Option<&Origin>) -> HandlerResult {
    ctx.customer().await?;
    let categories = catalog::list_active_categories(&ctx.app.db).await?;
    if categories.is_empty() {
        return Ok(Reaction::reply(Outgoing::text(ctx.chat_id, messages::NO_CATEGORIES)));
    }
    let keyboard: Keyboard = categories.into_iter()
        .map(|c| vec![Button::new(c.name, CallbackAction::Category(c.id))])
        .collect();
    Ok(Reaction::reply(Outgoing::show(ctx.chat_id, origin, messages::SELECT_CATEGORY, keyboard)))
}

/// Subcategories first, then products filed directly under the category.
pub async fn category(ctx: Ctx<'_>, origin: Option<&Origin>, id: i64) -> HandlerResult {
    ctx.customer().await?;
    let category = active_category(ctx, id).await?;
    let subcategories = catalog::list_subcategories(&ctx.app.db, id).await?;
    let products = catalog::list_products(&ctx.app.db, id).await?;

    let mut keyboard: Keyboard = subcategories.into_iter()
        .map(|s| vec![Button::new(format!("📁 {}", s.name), CallbackAction::Subcategory(s.id))])
        .chain(products.into_iter().map(|p| vec![Button::new(p.name, CallbackAction::Product(p.id))]))
        .collect();
    let text = if keyboard.is_empty() { messages::NO_PRODUCTS.to_string() } else { messages::category_header(&category.name) };
    keyboard.push(back(CallbackAction::BackToCategories));
    Ok(Reaction::reply(Outgoing::show(ctx.chat_id, origin, text, keyboard)))
}

pub async fn subcategory(ctx: Ctx<'_>, origin: Option<&Origin>, id: i64) -> HandlerResult {
    ctx.customer().await?;
    let subcategory = catalog::get_subcategory(&ctx.app.db, id).await?;
    if !subcategory.is_active { return Err(StorefrontError::not_found("subcategory", id)); }
    let products = catalog::list_products_in_subcategory(&ctx.app.db, id).await?;

    let mut keyboard: Keyboard = products.into_iter()
        .map(|p| vec![Button::new(p.name, CallbackAction::Product(p.id))])
        .collect();
    let text = if keyboard.is_empty() { messages::NO_PRODUCTS.to_string() } else { messages::category_header(&subcategory.name) };
    keyboard.push(back(CallbackAction::Category(subcategory.category_id)));
    Ok(Reaction::reply(Outgoing::show(ctx.chat_id, origin, text, keyboard)))
}

/// Product card listing its variants, shown over the gallery cover when there is one.
pub async fn product(ctx: Ctx<'_>, origin: Option<&Origin>, id: i64) -> HandlerResult {
    ctx.customer().await?;
    let product = active_product(ctx, id).await?;
    let variants = catalog::list_variants(&ctx.app.db, id).await?;
    let parent = match product.subcategory_id {
        Some(sub) => CallbackAction::Subcategory(sub),
        None => CallbackAction::Category(product.category_id),
    };

    let mut keyboard: Keyboard = variants.iter()
        .map(|v| vec![Button::new(messages::variant_label(v, ctx.currency()), CallbackAction::Variant(v.id))])
        .collect();
    let (text, cover) = if variants.is_empty() {
        (messages::NO_VARIANTS.to_string(), None)
    } else {
        (messages::product_text(&product), catalog::list_product_images(&ctx.app.db, id).await?.into_iter().next())
    };
    keyboard.push(back(parent));

    let outgoing = match cover {
        Some(image) => Outgoing::Photo { to: Target::Chat(ctx.chat_id), file_id: image.file_id, caption: text, keyboard },
        None => Outgoing::show(ctx.chat_id, origin, text, keyboard),
    };
    Ok(Reaction::reply(outgoing))
}

/// Variant card. Variants with an image get a fresh photo message.
pub async fn variant(ctx: Ctx<'_>, origin: Option<&Origin>, id: i64) -> HandlerResult {
    ctx.customer().await?;
    let variant = catalog::get_variant(&ctx.app.db, id).await?;
    if !variant.is_active { return Err(StorefrontError::not_found("variant", id)); }
    let product = active_product(ctx, variant.product_id).await?;

    let mut keyboard: Keyboard = vec![];
    if variant.is_in_stock() {
        keyboard.push(vec![Button::new("🛒 Add to cart", CallbackAction::AddToCart(variant.id))]);
    }
    keyboard.push(vec![Button::new("🛒 View cart", CallbackAction::ViewCart)]);
    keyboard.push(back(CallbackAction::Product(product.id)));

    let text = messages::variant_text(&product, &variant, ctx.currency());
    let outgoing = match variant.image_file_id {
        Some(file_id) if !file_id.is_empty() => Outgoing::Photo { to: Target::Chat(ctx.chat_id), file_id, caption: text, keyboard },
        _ => Outgoing::show(ctx.chat_id, origin, text, keyboard),
    };
    Ok(Reaction::reply(outgoing))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::outgoing::ReplyKeyboard;
    use crate::bot::handlers::tests::{app, register, stocked, CUSTOMER};
    use crate::db::catalog::tests::{category as category_input, product as product_input, variant as variant_input};
    use crate::db::catalog::{ProductImageInput, ProductInput, SubcategoryInput, VariantInput};
    use crate::domain::Profile;

    fn buttons(reaction: &Reaction) -> Vec<CallbackAction> {
        let keyboard = match &reaction.outgoing[0] {
            Outgoing::Send { keyboard: ReplyKeyboard::Inline(k), .. } => k,
            Outgoing::Edit { keyboard, .. } | Outgoing::Photo { keyboard, .. } => keyboard,
            other => panic!("no keyboard in {other:?}"),
        };
        keyboard.iter().flatten().map(|b| b.action).collect()
    }

    #[tokio::test]
    async fn test_unregistered_cannot_browse() {
        let app = app().await;
        let sender = Profile::new(CUSTOMER, "Ann");
        let err = categories(Ctx::new(&app, &sender, CUSTOMER), None).await.unwrap_err();
        assert!(matches!(err, StorefrontError::NotRegistered));
    }

    #[tokio::test]
    async fn test_navigation_path() {
        let app = app().await;
        register(&app, CUSTOMER).await;
        let sender = Profile::new(CUSTOMER, "Ann");
        let ctx = Ctx::new(&app, &sender, CUSTOMER);

        let cat = catalog::create_category(&app.db, &category_input("Clothing")).await.unwrap();
        let sub = catalog::create_subcategory(&app.db, &SubcategoryInput { category_id: cat.id, name: "Shoes".into(), description: None, position: 0 }).await.unwrap();
        let shirt = catalog::create_product(&app.db, &product_input(cat.id, "T-Shirt")).await.unwrap();
        let sneakers = catalog::create_product(&app.db, &ProductInput { subcategory_id: Some(sub.id), ..product_input(cat.id, "Sneakers") }).await.unwrap();
        let small = catalog::create_variant(&app.db, &variant_input(shirt.id, "S", 1_999, 3)).await.unwrap();
        catalog::create_variant(&app.db, &VariantInput { is_active: false, ..variant_input(shirt.id, "XXL", 1_999, 3) }).await.unwrap();

        assert_eq!(buttons(&categories(ctx, None).await.unwrap()), vec![CallbackAction::Category(cat.id)]);
        assert_eq!(
            buttons(&category(ctx, None, cat.id).await.unwrap()),
            vec![CallbackAction::Subcategory(sub.id), CallbackAction::Product(shirt.id), CallbackAction::BackToCategories],
        );
        assert_eq!(
            buttons(&subcategory(ctx, None, sub.id).await.unwrap()),
            vec![CallbackAction::Product(sneakers.id), CallbackAction::Category(cat.id)],
        );

        let origin = Origin { chat_id: CUSTOMER, message_id: 7, text: None };
        let shown = product(ctx, Some(&origin), shirt.id).await.unwrap();
        assert!(matches!(&shown.outgoing[0], Outgoing::Edit { message_id: 7, text, .. } if text.contains("T-Shirt")));
        assert_eq!(buttons(&shown), vec![CallbackAction::Variant(small.id), CallbackAction::Category(cat.id)]);

        let card = variant(ctx, Some(&origin), small.id).await.unwrap();
        assert_eq!(
            buttons(&card),
            vec![CallbackAction::AddToCart(small.id), CallbackAction::ViewCart, CallbackAction::Product(shirt.id)],
        );
        assert!(matches!(&card.outgoing[0], Outgoing::Edit { text, .. } if text.contains("$19.99") && text.contains("In stock: 3")));
    }

    #[tokio::test]
    async fn test_product_gallery_cover() {
        let app = app().await;
        register(&app, CUSTOMER).await;
        let sender = Profile::new(CUSTOMER, "Ann");
        let ctx = Ctx::new(&app, &sender, CUSTOMER);
        let variant_id = stocked(&app, 5).await;
        let product_id = catalog::get_variant(&app.db, variant_id).await.unwrap().product_id;
        catalog::add_product_image(&app.db, product_id, &ProductImageInput { file_id: "AgAD-side".into(), position: 1 }).await.unwrap();
        catalog::add_product_image(&app.db, product_id, &ProductImageInput { file_id: "AgAD-cover".into(), position: 0 }).await.unwrap();

        let origin = Origin { chat_id: CUSTOMER, message_id: 3, text: None };
        let shown = product(ctx, Some(&origin), product_id).await.unwrap();
        assert!(matches!(
            &shown.outgoing[..],
            [Outgoing::Photo { to: Target::Chat(CUSTOMER), file_id, caption, .. }] if file_id == "AgAD-cover" && caption.contains("Pizza")
        ));
        assert_eq!(buttons(&shown)[0], CallbackAction::Variant(variant_id));
    }

    #[tokio::test]
    async fn test_sold_out_variant_has_no_add_button_and_photo_is_sent() {
        let app = app().await;
        register(&app, CUSTOMER).await;
        let sender = Profile::new(CUSTOMER, "Ann");
        let ctx = Ctx::new(&app, &sender, CUSTOMER);
        let id = stocked(&app, 0).await;
        let v = catalog::get_variant(&app.db, id).await.unwrap();
        let input = VariantInput { image_file_id: Some("AgAD-photo".into()), ..variant_input(v.product_id, "Large", 1_500, 0) };
        catalog::update_variant(&app.db, id, &input).await.unwrap();

        let card = variant(ctx, None, id).await.unwrap();
        assert!(matches!(&card.outgoing[0], Outgoing::Photo { file_id, .. } if file_id == "AgAD-photo"));
        assert!(!buttons(&card).contains(&CallbackAction::AddToCart(id)));
    }

    #[tokio::test]
    async fn test_empty_catalog() {
        let app = app().await;
        register(&app, CUSTOMER).await;
        let sender = Profile::new(CUSTOMER, "Ann");
        let reaction = categories(Ctx::new(&app, &sender, CUSTOMER), None).await.unwrap();
        assert_eq!(reaction.outgoing, vec![Outgoing::text(CUSTOMER, messages::NO_CATEGORIES)]);
    }
}
