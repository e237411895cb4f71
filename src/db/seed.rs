//! Sample catalog for local development (`SEED_SAMPLE_DATA=true`).

use sqlx::SqlitePool;
use crate::db::catalog::{self, CategoryInput, ProductInput, VariantInput};
use crate::Result;

struct SampleProduct {
    name: &'static str,
    description: &'static str,
    variants: &'static [(&'static str, i64, i64)],
}

const SAMPLE: &[(&str, &str, &[SampleProduct])] = &[
    ("Electronics", "Electronic devices and gadgets", &[
        SampleProduct { name: "Smartphone X", description: "Latest model smartphone", variants: &[
            ("128GB Black", 69_999, 50), ("256GB White", 79_999, 30), ("512GB Blue", 99_999, 20),
        ] },
        SampleProduct { name: "Laptop Pro", description: "High-performance laptop for work and gaming", variants: &[
            ("13-inch i5", 129_999, 25), ("15-inch i7", 179_999, 15),
        ] },
    ]),
    ("Clothing", "Fashion and apparel", &[
        SampleProduct { name: "Cotton T-Shirt", description: "Comfortable cotton t-shirt", variants: &[
            ("Small - Red", 1_999, 100), ("Medium - Blue", 1_999, 100), ("Large - Green", 1_999, 80),
        ] },
        SampleProduct { name: "Denim Jeans", description: "Classic blue jeans", variants: &[
            ("Size 30", 4_999, 60), ("Size 32", 4_999, 70), ("Size 34", 4_999, 50),
        ] },
    ]),
    ("Food & Beverages", "Food items and drinks", &[
        SampleProduct { name: "Pizza", description: "Stone-baked pizza", variants: &[
            ("Margherita - Small", 999, 999), ("Margherita - Large", 1_499, 999), ("Pepperoni - Large", 1_699, 999),
        ] },
    ]),
];

/// Inserts the sample catalog unless categories already exist. Returns whether anything was written.
pub async fn sample_data(db: &SqlitePool) -> Result<bool> {
    if !catalog::list_categories(db).await?.is_empty() {
        tracing::info!("catalog already populated, skipping seed");
        return Ok(false);
    }
    for (position, (name, description, products)) in SAMPLE.iter().enumerate() {
        let category = catalog::create_category(db, &CategoryInput {
            name: name.to_string(), description: Some(description.to_string()), position: position as i64, is_active: true,
        }).await?;
        for product in products.iter() {
            let p = catalog::create_product(db, &ProductInput {
                category_id: category.id, subcategory_id: None, name: product.name.to_string(),
                description: Some(product.description.to_string()), position: 0, is_active: true,
            }).await?;
            for (position, &(variant, price, stock)) in product.variants.iter().enumerate() {
                catalog::create_variant(db, &VariantInput {
                    product_id: p.id, name: variant.to_string(), description: None, price, stock,
                    image_file_id: None, position: position as i64, is_active: true,
                }).await?;
            }
        }
    }
    tracing::info!(categories = SAMPLE.len(), "sample catalog seeded");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let db = connect_in_memory().await.unwrap();
        assert!(sample_data(&db).await.unwrap());
        assert!(!sample_data(&db).await.unwrap());
        let categories = catalog::list_active_categories(&db).await.unwrap();
        assert_eq!(categories.len(), 3);
        let products = catalog::list_products(&db, categories[0].id).await.unwrap();
        assert_eq!(products.len(), 2);
    }
}
