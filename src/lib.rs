pub mod application;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::catalog::CatalogService;
use application::order_workflow::OrderWorkflow;
use domain::ports::ListCache;
use infrastructure::order_repo::DieselOrderStore;
use infrastructure::stock::DieselStockLedger;

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// The workflow type the HTTP layer runs against.
pub type AppWorkflow = OrderWorkflow<DieselOrderStore, DieselStockLedger>;

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) {
    let mut conn = pool.get().expect("Failed to get DB connection for migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::orders::create_order,
        handlers::orders::check_stock,
        handlers::orders::list_orders,
        handlers::orders::get_order,
        handlers::orders::cancel_order,
        handlers::products::list_products,
        handlers::products::get_product,
        handlers::products::create_product,
        handlers::products::update_product,
        handlers::products::delete_product,
        handlers::brands::list_brands,
        handlers::brands::get_brand,
        handlers::brands::create_brand,
        handlers::brands::update_brand,
        handlers::brands::delete_brand,
        handlers::customers::list_customers,
        handlers::customers::get_customer,
        handlers::customers::create_customer,
        handlers::customers::update_customer,
        handlers::customers::delete_customer,
    ),
    components(schemas(
        handlers::orders::OrderItemRequest,
        handlers::orders::CreateOrderRequest,
        handlers::orders::CreateOrderResponse,
        handlers::orders::OrderLineResponse,
        handlers::orders::CheckStockRequest,
        handlers::orders::CheckStockResponse,
        handlers::orders::StockShortageResponse,
        handlers::orders::CancelOrderResponse,
        handlers::orders::ReportLineResponse,
        handlers::orders::CustomerOrdersResponse,
        handlers::orders::InvoiceCustomerResponse,
        handlers::orders::InvoiceItemResponse,
        handlers::orders::OrderInvoiceResponse,
        handlers::products::CreateProductRequest,
        handlers::products::UpdateProductRequest,
        handlers::products::ProductResponse,
        handlers::products::ProductWithBrandResponse,
        handlers::brands::CreateBrandRequest,
        handlers::brands::UpdateBrandRequest,
        handlers::brands::BrandResponse,
        handlers::customers::CreateCustomerRequest,
        handlers::customers::UpdateCustomerRequest,
        handlers::customers::CustomerResponse,
    )),
    tags(
        (name = "orders", description = "Checkout, stock checks, cancellation and order views"),
        (name = "catalog", description = "Brands, products and customers"),
    )
)]
struct ApiDoc;

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    pool: DbPool,
    cache: Arc<dyn ListCache>,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let workflow = web::Data::new(OrderWorkflow::new(
        DieselOrderStore::new(pool.clone()),
        DieselStockLedger::new(pool.clone()),
        Arc::clone(&cache),
    ));
    let catalog = web::Data::new(CatalogService::new(pool, cache));

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(workflow.clone())
            .app_data(catalog.clone())
            .wrap(Logger::default())
            .service(
                web::scope("/orders")
                    .route("", web::post().to(handlers::orders::create_order))
                    .route("", web::get().to(handlers::orders::list_orders))
                    .route("/check-stock", web::post().to(handlers::orders::check_stock))
                    .route("/{order_id}", web::get().to(handlers::orders::get_order))
                    .route("/{order_id}", web::delete().to(handlers::orders::cancel_order)),
            )
            .service(
                web::scope("/products")
                    .route("", web::get().to(handlers::products::list_products))
                    .route("", web::post().to(handlers::products::create_product))
                    .route("/{id}", web::get().to(handlers::products::get_product))
                    .route("/{id}", web::patch().to(handlers::products::update_product))
                    .route("/{id}", web::delete().to(handlers::products::delete_product)),
            )
            .service(
                web::scope("/brands")
                    .route("", web::get().to(handlers::brands::list_brands))
                    .route("", web::post().to(handlers::brands::create_brand))
                    .route("/{id}", web::get().to(handlers::brands::get_brand))
                    .route("/{id}", web::patch().to(handlers::brands::update_brand))
                    .route("/{id}", web::delete().to(handlers::brands::delete_brand)),
            )
            .service(
                web::scope("/customers")
                    .route("", web::get().to(handlers::customers::list_customers))
                    .route("", web::post().to(handlers::customers::create_customer))
                    .route("/{id}", web::get().to(handlers::customers::get_customer))
                    .route("/{id}", web::patch().to(handlers::customers::update_customer))
                    .route("/{id}", web::delete().to(handlers::customers::delete_customer)),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
