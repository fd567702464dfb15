//! Table descriptions for the stored entities

use sqlx::{postgres::PgArguments, query::QueryAs, Postgres};

use super::Entity;
use shared::{
    Category, CategoryDraft, Product, ProductDraft, StockLevel, StockLevelDraft, Supplier,
    SupplierInput,
};

type Query<'q, E> = QueryAs<'q, Postgres, E, PgArguments>;

impl Entity for Product {
    type Draft = ProductDraft;

    const NAME: &'static str = "Product";
    const TABLE: &'static str = "products";
    const COLUMNS: &'static str = "id, name, description, price, stock_quantity, \
        low_stock_threshold, category_id, supplier_id, image, created_by, created_date";
    const WRITE_COLUMNS: &'static [&'static str] = &[
        "name",
        "description",
        "price",
        "stock_quantity",
        "low_stock_threshold",
        "category_id",
        "supplier_id",
        "image",
        "created_by",
        "created_date",
    ];

    fn bind_draft<'q>(draft: &'q ProductDraft, query: Query<'q, Self>) -> Query<'q, Self> {
        query
            .bind(&draft.name)
            .bind(&draft.description)
            .bind(draft.price)
            .bind(draft.stock_quantity)
            .bind(draft.low_stock_threshold)
            .bind(draft.category_id)
            .bind(draft.supplier_id)
            .bind(&draft.image)
            .bind(&draft.created_by)
            .bind(draft.created_date)
    }
}

impl Entity for Category {
    type Draft = CategoryDraft;

    const NAME: &'static str = "Category";
    const TABLE: &'static str = "categories";
    const COLUMNS: &'static str = "id, name, created_by, created_date";
    const WRITE_COLUMNS: &'static [&'static str] = &["name", "created_by", "created_date"];

    fn bind_draft<'q>(draft: &'q CategoryDraft, query: Query<'q, Self>) -> Query<'q, Self> {
        query
            .bind(&draft.name)
            .bind(&draft.created_by)
            .bind(draft.created_date)
    }
}

impl Entity for Supplier {
    type Draft = SupplierInput;

    const NAME: &'static str = "Supplier";
    const TABLE: &'static str = "suppliers";
    const COLUMNS: &'static str = "id, name, contact_name, email, phone, address";
    const WRITE_COLUMNS: &'static [&'static str] =
        &["name", "contact_name", "email", "phone", "address"];

    fn bind_draft<'q>(draft: &'q SupplierInput, query: Query<'q, Self>) -> Query<'q, Self> {
        query
            .bind(&draft.name)
            .bind(&draft.contact_name)
            .bind(&draft.email)
            .bind(&draft.phone)
            .bind(&draft.address)
    }
}

impl Entity for StockLevel {
    type Draft = StockLevelDraft;

    const NAME: &'static str = "Stock level";
    const TABLE: &'static str = "stock_levels";
    const COLUMNS: &'static str = "id, product_id, quantity_change, change_date, change_type";
    const WRITE_COLUMNS: &'static [&'static str] =
        &["product_id", "quantity_change", "change_date", "change_type"];
    const ORDER_BY: &'static str = "change_date, id";
    const APPEND_ONLY: bool = true;

    fn bind_draft<'q>(draft: &'q StockLevelDraft, query: Query<'q, Self>) -> Query<'q, Self> {
        query
            .bind(draft.product_id)
            .bind(draft.quantity_change)
            .bind(draft.change_date)
            .bind(draft.change_type.as_str())
    }
}
