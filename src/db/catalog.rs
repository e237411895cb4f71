//! Catalog repositories: categories, subcategories, products and variants.

use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;
use validator::{Validate, ValidationError, ValidationErrors};
use crate::db::found;
use crate::domain::{Category, Product, ProductImage, Subcategory, Variant};
use crate::Result;

fn active() -> bool { true }

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CategoryInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[serde(default)]
    pub position: i64,
    #[serde(default = "active")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubcategoryInput {
    pub category_id: i64,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[serde(default)]
    pub position: i64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProductInput {
    pub category_id: i64,
    pub subcategory_id: Option<i64>,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 4000))]
    pub description: Option<String>,
    #[serde(default)]
    pub position: i64,
    #[serde(default = "active")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VariantInput {
    pub product_id: i64,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    /// Minor units.
    #[validate(range(min = 0))]
    pub price: i64,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub stock: i64,
    #[validate(length(max = 500))]
    pub image_file_id: Option<String>,
    #[serde(default)]
    pub position: i64,
    #[serde(default = "active")]
    pub is_active: bool,
}

// -----------------------------------------------------------------------------
// Categories
// -----------------------------------------------------------------------------

pub async fn list_active_categories(db: &SqlitePool) -> Result<Vec<Category>> {
    Ok(sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE is_active = 1 ORDER BY position, name")
        .fetch_all(db).await?)
}

pub async fn list_categories(db: &SqlitePool) -> Result<Vec<Category>> {
    Ok(sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY position, name").fetch_all(db).await?)
}

pub async fn get_category(db: &SqlitePool, id: i64) -> Result<Category> {
    let row = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = ?").bind(id).fetch_optional(db).await?;
    found(row, "category", id)
}

pub async fn create_category(db: &SqlitePool, r: &CategoryInput) -> Result<Category> {
    let c = sqlx::query_as::<_, Category>("INSERT INTO categories (name, description, position, is_active, created_at) VALUES (?, ?, ?, ?, ?) RETURNING *")
        .bind(r.name.trim()).bind(&r.description).bind(r.position).bind(r.is_active).bind(Utc::now())
        .fetch_one(db).await?;
    tracing::info!(category_id = c.id, name = %c.name, "category created");
    Ok(c)
}

pub async fn update_category(db: &SqlitePool, id: i64, r: &CategoryInput) -> Result<Category> {
    let row = sqlx::query_as::<_, Category>("UPDATE categories SET name = ?, description = ?, position = ?, is_active = ? WHERE id = ? RETURNING *")
        .bind(r.name.trim()).bind(&r.description).bind(r.position).bind(r.is_active).bind(id)
        .fetch_optional(db).await?;
    found(row, "category", id)
}

/// Shows or hides a category in the bot without touching its other fields.
pub async fn set_active(db: &SqlitePool, id: i64, is_active: bool) -> Result<Category> {
    let row = sqlx::query_as::<_, Category>("UPDATE categories SET is_active = ? WHERE id = ? RETURNING *")
        .bind(is_active).bind(id)
        .fetch_optional(db).await?;
    let c = found(row, "category", id)?;
    tracing::info!(category_id = id, is_active, "category visibility changed");
    Ok(c)
}

// -----------------------------------------------------------------------------
// Subcategories
// -----------------------------------------------------------------------------

pub async fn list_subcategories(db: &SqlitePool, category_id: i64) -> Result<Vec<Subcategory>> {
    Ok(sqlx::query_as::<_, Subcategory>("SELECT * FROM subcategories WHERE category_id = ? AND is_active = 1 ORDER BY position, name")
        .bind(category_id).fetch_all(db).await?)
}

pub async fn get_subcategory(db: &SqlitePool, id: i64) -> Result<Subcategory> {
    let row = sqlx::query_as::<_, Subcategory>("SELECT * FROM subcategories WHERE id = ?").bind(id).fetch_optional(db).await?;
    found(row, "subcategory", id)
}

pub async fn create_subcategory(db: &SqlitePool, r: &SubcategoryInput) -> Result<Subcategory> {
    get_category(db, r.category_id).await?;
    let s = sqlx::query_as::<_, Subcategory>("INSERT INTO subcategories (category_id, name, description, position, is_active, created_at) VALUES (?, ?, ?, ?, 1, ?) RETURNING *")
        .bind(r.category_id).bind(r.name.trim()).bind(&r.description).bind(r.position).bind(Utc::now())
        .fetch_one(db).await?;
    tracing::info!(subcategory_id = s.id, category_id = s.category_id, "subcategory created");
    Ok(s)
}

// -----------------------------------------------------------------------------
// Products
// -----------------------------------------------------------------------------

/// Active products filed directly under the category (no subcategory).
pub async fn list_products(db: &SqlitePool, category_id: i64) -> Result<Vec<Product>> {
    Ok(sqlx::query_as::<_, Product>("SELECT * FROM products WHERE category_id = ? AND subcategory_id IS NULL AND is_active = 1 ORDER BY position, name")
        .bind(category_id).fetch_all(db).await?)
}

pub async fn list_products_in_subcategory(db: &SqlitePool, subcategory_id: i64) -> Result<Vec<Product>> {
    Ok(sqlx::query_as::<_, Product>("SELECT * FROM products WHERE subcategory_id = ? AND is_active = 1 ORDER BY position, name")
        .bind(subcategory_id).fetch_all(db).await?)
}

/// Every product of a category, inactive ones and subcategories included.
pub async fn list_all_products(db: &SqlitePool, category_id: i64) -> Result<Vec<Product>> {
    Ok(sqlx::query_as::<_, Product>("SELECT * FROM products WHERE category_id = ? ORDER BY position, name")
        .bind(category_id).fetch_all(db).await?)
}

pub async fn get_product(db: &SqlitePool, id: i64) -> Result<Product> {
    let row = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?").bind(id).fetch_optional(db).await?;
    found(row, "product", id)
}

async fn check_product_parents(db: &SqlitePool, r: &ProductInput) -> Result<()> {
    get_category(db, r.category_id).await?;
    if let Some(subcategory_id) = r.subcategory_id {
        let sub = get_subcategory(db, subcategory_id).await?;
        if sub.category_id != r.category_id {
            let mut errors = ValidationErrors::new();
            errors.add("subcategory_id", ValidationError::new("subcategory_not_in_category"));
            return Err(errors.into());
        }
    }
    Ok(())
}

pub async fn create_product(db: &SqlitePool, r: &ProductInput) -> Result<Product> {
    check_product_parents(db, r).await?;
    let p = sqlx::query_as::<_, Product>("INSERT INTO products (category_id, subcategory_id, name, description, position, is_active, created_at) VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING *")
        .bind(r.category_id).bind(r.subcategory_id).bind(r.name.trim()).bind(&r.description).bind(r.position).bind(r.is_active).bind(Utc::now())
        .fetch_one(db).await?;
    tracing::info!(product_id = p.id, category_id = p.category_id, name = %p.name, "product created");
    Ok(p)
}

pub async fn update_product(db: &SqlitePool, id: i64, r: &ProductInput) -> Result<Product> {
    check_product_parents(db, r).await?;
    let row = sqlx::query_as::<_, Product>("UPDATE products SET category_id = ?, subcategory_id = ?, name = ?, description = ?, position = ?, is_active = ? WHERE id = ? RETURNING *")
        .bind(r.category_id).bind(r.subcategory_id).bind(r.name.trim()).bind(&r.description).bind(r.position).bind(r.is_active).bind(id)
        .fetch_optional(db).await?;
    found(row, "product", id)
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProductImageInput {
    #[validate(length(min = 1, max = 200))]
    pub file_id: String,
    #[serde(default)]
    pub position: i64,
}

/// Gallery of a product, cover first.
pub async fn list_product_images(db: &SqlitePool, product_id: i64) -> Result<Vec<ProductImage>> {
    Ok(sqlx::query_as::<_, ProductImage>("SELECT * FROM product_images WHERE product_id = ? ORDER BY position, id")
        .bind(product_id).fetch_all(db).await?)
}

pub async fn add_product_image(db: &SqlitePool, product_id: i64, r: &ProductImageInput) -> Result<ProductImage> {
    get_product(db, product_id).await?;
    let image = sqlx::query_as::<_, ProductImage>("INSERT INTO product_images (product_id, file_id, position, created_at) VALUES (?, ?, ?, ?) RETURNING *")
        .bind(product_id).bind(r.file_id.trim()).bind(r.position).bind(Utc::now())
        .fetch_one(db).await?;
    tracing::info!(image_id = image.id, product_id, "product image added");
    Ok(image)
}

pub async fn delete_product_image(db: &SqlitePool, id: i64) -> Result<()> {
    let done = sqlx::query("DELETE FROM product_images WHERE id = ?").bind(id).execute(db).await?;
    if done.rows_affected() == 0 { return Err(crate::StorefrontError::not_found("image", id)); }
    Ok(())
}

// -----------------------------------------------------------------------------
// Variants
// -----------------------------------------------------------------------------

pub async fn list_variants(db: &SqlitePool, product_id: i64) -> Result<Vec<Variant>> {
    Ok(sqlx::query_as::<_, Variant>("SELECT * FROM product_variants WHERE product_id = ? AND is_active = 1 ORDER BY position, name")
        .bind(product_id).fetch_all(db).await?)
}

pub async fn get_variant(db: &SqlitePool, id: i64) -> Result<Variant> {
    let row = sqlx::query_as::<_, Variant>("SELECT * FROM product_variants WHERE id = ?").bind(id).fetch_optional(db).await?;
    found(row, "variant", id)
}

pub async fn create_variant(db: &SqlitePool, r: &VariantInput) -> Result<Variant> {
    get_product(db, r.product_id).await?;
    let v = sqlx::query_as::<_, Variant>("INSERT INTO product_variants (product_id, name, description, price, stock, image_file_id, position, is_active, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *")
        .bind(r.product_id).bind(r.name.trim()).bind(&r.description).bind(r.price).bind(r.stock)
        .bind(&r.image_file_id).bind(r.position).bind(r.is_active).bind(Utc::now())
        .fetch_one(db).await?;
    tracing::info!(variant_id = v.id, product_id = v.product_id, price = v.price, stock = v.stock, "variant created");
    Ok(v)
}

pub async fn update_variant(db: &SqlitePool, id: i64, r: &VariantInput) -> Result<Variant> {
    get_product(db, r.product_id).await?;
    let row = sqlx::query_as::<_, Variant>("UPDATE product_variants SET product_id = ?, name = ?, description = ?, price = ?, stock = ?, image_file_id = ?, position = ?, is_active = ? WHERE id = ? RETURNING *")
        .bind(r.product_id).bind(r.name.trim()).bind(&r.description).bind(r.price).bind(r.stock)
        .bind(&r.image_file_id).bind(r.position).bind(r.is_active).bind(id)
        .fetch_optional(db).await?;
    found(row, "variant", id)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::connect_in_memory;
    use crate::StorefrontError;

    pub(crate) fn category(name: &str) -> CategoryInput {
        CategoryInput { name: name.into(), description: None, position: 0, is_active: true }
    }

    pub(crate) fn product(category_id: i64, name: &str) -> ProductInput {
        ProductInput { category_id, subcategory_id: None, name: name.into(), description: Some("desc".into()), position: 0, is_active: true }
    }

    pub(crate) fn variant(product_id: i64, name: &str, price: i64, stock: i64) -> VariantInput {
        VariantInput { product_id, name: name.into(), description: None, price, stock, image_file_id: None, position: 0, is_active: true }
    }

    #[tokio::test]
    async fn test_catalog_round_trip() {
        let db = connect_in_memory().await.unwrap();
        let cat = create_category(&db, &CategoryInput { description: Some("Gadgets".into()), position: 2, ..category("Electronics") }).await.unwrap();
        assert_eq!(get_category(&db, cat.id).await.unwrap().description.as_deref(), Some("Gadgets"));

        let p = create_product(&db, &product(cat.id, "Smartphone")).await.unwrap();
        let fetched = get_product(&db, p.id).await.unwrap();
        assert_eq!((fetched.name.as_str(), fetched.category_id), ("Smartphone", cat.id));

        let v = create_variant(&db, &variant(p.id, "128GB Black", 59_999, 10)).await.unwrap();
        let fetched = get_variant(&db, v.id).await.unwrap();
        assert_eq!((fetched.price, fetched.stock, fetched.name.as_str()), (59_999, 10, "128GB Black"));
        assert_eq!(list_variants(&db, p.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_subcategory_split() {
        let db = connect_in_memory().await.unwrap();
        let cat = create_category(&db, &category("Clothing")).await.unwrap();
        let sub = create_subcategory(&db, &SubcategoryInput { category_id: cat.id, name: "Shoes".into(), description: None, position: 0 }).await.unwrap();
        create_product(&db, &product(cat.id, "T-Shirt")).await.unwrap();
        create_product(&db, &ProductInput { subcategory_id: Some(sub.id), ..product(cat.id, "Sneakers") }).await.unwrap();

        let direct = list_products(&db, cat.id).await.unwrap();
        assert_eq!(direct.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(), vec!["T-Shirt"]);
        assert_eq!(list_products_in_subcategory(&db, sub.id).await.unwrap()[0].name, "Sneakers");
        assert_eq!(list_all_products(&db, cat.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_subcategory_must_match_category() {
        let db = connect_in_memory().await.unwrap();
        let a = create_category(&db, &category("A")).await.unwrap();
        let b = create_category(&db, &category("B")).await.unwrap();
        let sub = create_subcategory(&db, &SubcategoryInput { category_id: a.id, name: "Sub".into(), description: None, position: 0 }).await.unwrap();
        let err = create_product(&db, &ProductInput { subcategory_id: Some(sub.id), ..product(b.id, "X") }).await.unwrap_err();
        assert!(matches!(err, StorefrontError::Validation(_)));
    }

    #[tokio::test]
    async fn test_inactive_hidden_and_missing() {
        let db = connect_in_memory().await.unwrap();
        let cat = create_category(&db, &category("Food")).await.unwrap();
        update_category(&db, cat.id, &CategoryInput { is_active: false, ..category("Food") }).await.unwrap();
        assert!(list_active_categories(&db).await.unwrap().is_empty());
        assert_eq!(list_categories(&db).await.unwrap().len(), 1);
        assert!(matches!(get_variant(&db, 404).await, Err(StorefrontError::NotFound { entity: "variant", id: 404 })));
    }

    #[tokio::test]
    async fn test_product_gallery_order() {
        let db = connect_in_memory().await.unwrap();
        let cat = create_category(&db, &category("Clothing")).await.unwrap();
        let p = create_product(&db, &product(cat.id, "Hoodie")).await.unwrap();
        let back = add_product_image(&db, p.id, &ProductImageInput { file_id: "AgAD-back".into(), position: 2 }).await.unwrap();
        add_product_image(&db, p.id, &ProductImageInput { file_id: " AgAD-front ".into(), position: 1 }).await.unwrap();

        let gallery = list_product_images(&db, p.id).await.unwrap();
        assert_eq!(gallery.iter().map(|i| i.file_id.as_str()).collect::<Vec<_>>(), vec!["AgAD-front", "AgAD-back"]);
        delete_product_image(&db, back.id).await.unwrap();
        assert_eq!(list_product_images(&db, p.id).await.unwrap().len(), 1);
        assert!(matches!(delete_product_image(&db, back.id).await, Err(StorefrontError::NotFound { entity: "image", .. })));
        assert!(matches!(
            add_product_image(&db, 404, &ProductImageInput { file_id: "x".into(), position: 0 }).await,
            Err(StorefrontError::NotFound { entity: "product", id: 404 })
        ));
    }

    #[tokio::test]
    async fn test_set_active_toggles_visibility_only() {
        let db = connect_in_memory().await.unwrap();
        let cat = create_category(&db, &CategoryInput { description: Some("Hot food".into()), position: 3, ..category("Food") }).await.unwrap();

        let hidden = set_active(&db, cat.id, false).await.unwrap();
        assert!(!hidden.is_active);
        assert_eq!((hidden.name.as_str(), hidden.description.as_deref(), hidden.position), ("Food", Some("Hot food"), 3));
        assert!(list_active_categories(&db).await.unwrap().is_empty());

        assert!(set_active(&db, cat.id, true).await.unwrap().is_active);
        assert_eq!(list_active_categories(&db).await.unwrap().len(), 1);
        assert!(matches!(set_active(&db, 99, true).await, Err(StorefrontError::NotFound { entity: "category", id: 99 })));
    }
}
