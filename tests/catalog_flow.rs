mod common;

use std::sync::Arc;

use storefront_admin::{
    dto::{
        categories::{CreateCategoryRequest, UpdateCategoryRequest},
        products::{ImageUpload, ProductForm},
    },
    entity::products::QuantityType,
    error::AppError,
    pagination::PageRequest,
    services::{category_service, product_service},
    state::AppState,
};

use common::{StubbornBlobStore, database_url, memory_state};

fn image(name: &str) -> ImageUpload {
    ImageUpload {
        file_name: name.to_string(),
        bytes: vec![0x89, 0x50, 0x4e, 0x47],
    }
}

fn form(name: &str, price: &str, category_id: Option<uuid::Uuid>) -> ProductForm {
    ProductForm {
        name: name.to_string(),
        price: price.to_string(),
        quantity: 3,
        category_id,
        ..Default::default()
    }
}

// Category lifecycle, product writes with images, and the delete guards between them.
#[tokio::test]
async fn categories_products_and_images_flow() -> anyhow::Result<()> {
    let Some(database_url) = database_url() else {
        return Ok(());
    };
    let (state, blobs) = memory_state(&database_url).await?;

    // Categories
    let shoes = category_service::create_category(
        &state,
        CreateCategoryRequest {
            name: "Shoes".into(),
            description: Some("Running and walking".into()),
        },
    )
    .await?;
    assert_eq!(shoes.product_count, 0);

    let duplicate = category_service::create_category(
        &state,
        CreateCategoryRequest {
            name: "Shoes".into(),
            description: None,
        },
    )
    .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(msg)) if msg == category_service::DUPLICATE_NAME));

    let hats = category_service::create_category(
        &state,
        CreateCategoryRequest {
            name: "Hats".into(),
            description: None,
        },
    )
    .await?;
    let rename = category_service::update_category(
        &state,
        hats.id,
        UpdateCategoryRequest {
            name: "Shoes".into(),
            description: None,
        },
    )
    .await;
    assert!(matches!(rename, Err(AppError::Conflict(_))));

    let found = category_service::search_categories(&state, "WALK").await?;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, shoes.id);
    assert_eq!(category_service::search_categories(&state, "  ").await?.len(), 2);

    // Product validation
    let missing_price = product_service::create_product(&state, form("Trail Runner", "", None)).await;
    assert!(matches!(
        missing_price,
        Err(AppError::BadRequest(msg)) if msg == product_service::NAME_AND_PRICE_REQUIRED
    ));

    // Create with three images and a category
    let mut create = form("Trail Runner", "89.99", Some(shoes.id));
    create.quantity_type = Some(QuantityType::Limited);
    create.details = Some(r#"[{"type":"select","label":"Size","options":["41","42"]}]"#.into());
    create.images = vec![image("a.png"), image("b.png"), image("c.png")];
    let runner = product_service::create_product(&state, create).await?;
    assert_eq!(runner.category_name.as_deref(), Some("Shoes"));
    assert_eq!(runner.images.len(), 3);
    assert_eq!(runner.details.len(), 1);
    assert_eq!(runner.price.to_string(), "89.99");
    assert_eq!(blobs.len(), 3);

    // Bad details are stored as an empty list rather than rejected
    let mut sloppy = form("Sandal", "20", Some(shoes.id));
    sloppy.details = Some("{not json".into());
    let sandal = product_service::create_product(&state, sloppy).await?;
    assert!(sandal.details.is_empty());

    // Category with products cannot go away
    let guarded = category_service::delete_category(&state, shoes.id).await;
    assert!(matches!(guarded, Err(AppError::Conflict(msg)) if msg == category_service::HAS_PRODUCTS));
    let shoes_now = category_service::get_category_by_id(&state, shoes.id).await?;
    assert_eq!(shoes_now.product_count, 2);

    // Keep two, upload two: kept images first, in order
    let kept = vec![runner.images[0].clone(), runner.images[1].clone()];
    let mut update = form("Trail Runner v2", "95", Some(shoes.id));
    update.existing_images = Some(serde_json::to_string(&kept)?);
    update.images = vec![image("d.png"), image("e.png")];
    let updated = product_service::update_product(&state, runner.id, update).await?;
    assert_eq!(updated.name, "Trail Runner v2");
    assert_eq!(updated.images.len(), 4);
    assert_eq!(updated.images[..2], kept[..]);

    // Never more than five
    let mut overflow = form("Trail Runner v2", "95", Some(shoes.id));
    overflow.existing_images = Some(serde_json::to_string(&updated.images)?);
    overflow.images = vec![image("f.png"), image("g.png"), image("h.png")];
    let full = product_service::update_product(&state, runner.id, overflow).await?;
    assert_eq!(full.images.len(), product_service::MAX_IMAGES);
    assert_eq!(full.images[..4], updated.images[..]);

    // Removing an unlisted image changes nothing
    let before = blobs.len();
    let same = product_service::delete_product_image(&state, runner.id, "memory://blobs/nope").await?;
    assert_eq!(same.images, full.images);
    assert_eq!(blobs.len(), before);

    // Removing a listed image drops it from the list and the store
    let target = full.images[0].clone();
    let trimmed = product_service::delete_product_image(&state, runner.id, &target).await?;
    assert_eq!(trimmed.images.len(), 4);
    assert!(!trimmed.images.contains(&target));
    assert!(!blobs.contains(&target));
    let again = product_service::delete_product_image(&state, runner.id, &target).await?;
    assert_eq!(again.images, trimmed.images);

    // Another product's image cannot be adopted through the kept list
    let foreign = trimmed.images[0].clone();
    let mut adopt = form("Sandal", "20", Some(shoes.id));
    adopt.existing_images = Some(serde_json::to_string(&[&foreign])?);
    let sandal_after = product_service::update_product(&state, sandal.id, adopt).await?;
    assert!(sandal_after.images.is_empty());
    product_service::delete_product_image(&state, sandal.id, &foreign).await?;
    assert!(blobs.contains(&foreign));
    let runner_after = product_service::get_product_by_id(&state, runner.id).await?;
    assert_eq!(runner_after.images, trimmed.images);

    // Listing: filters and page math
    let page = product_service::list_products(&state, PageRequest::new(1, 1), None, Some(shoes.id)).await?;
    assert_eq!(page.total_count, 2);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.items.len(), 1);
    let searched = product_service::list_products(&state, PageRequest::default(), Some("runner"), None).await?;
    assert_eq!(searched.total_count, 1);
    let other = product_service::list_products(&state, PageRequest::default(), None, Some(hats.id)).await?;
    assert_eq!(other.total_count, 0);

    let choices = product_service::list_categories_for_select(&state).await?;
    let names: Vec<_> = choices.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Hats", "Shoes"]);

    // Deleting products, then the now-empty category
    product_service::delete_product(&state, runner.id).await?;
    product_service::delete_product(&state, sandal.id).await?;
    assert!(trimmed.images.iter().all(|url| !blobs.contains(url)));
    assert!(matches!(
        product_service::get_product_by_id(&state, runner.id).await,
        Err(AppError::NotFound(_))
    ));
    category_service::delete_category(&state, shoes.id).await?;
    assert!(matches!(
        category_service::delete_category(&state, shoes.id).await,
        Err(AppError::NotFound(_))
    ));

    // A store that cannot delete must not keep a product row alive
    let stubborn = AppState::new(state.orm.clone(), Arc::new(StubbornBlobStore::default()));
    let mut create = form("Lantern", "15.00", None);
    create.images = vec![image("lantern.jpg")];
    let lantern = product_service::create_product(&stubborn, create).await?;
    assert_eq!(lantern.images.len(), 1);
    assert!(lantern.category_name.is_none());

    product_service::delete_product(&stubborn, lantern.id).await?;
    assert!(matches!(
        product_service::get_product_by_id(&stubborn, lantern.id).await,
        Err(AppError::NotFound(_))
    ));

    Ok(())
}
