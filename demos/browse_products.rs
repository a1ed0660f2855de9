//! Product browsing example
//!
//! Pages through the dummyjson catalog the way a scrolling list would:
//! - Load the first page, then keep triggering at the last product
//! - Start a few image loads and cancel one of them
//! - Pull-to-refresh at the end
//!
//! Set `RUST_LOG=productlist_core=debug` to see the state transitions.

use productlist_core::{
    Config, Event, HttpNetworkService, ImageState, ProductListModel, ProductListWorker,
    ProductListWorking,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::default();
    let network = Arc::new(HttpNetworkService::new(&config)?);
    let worker = Arc::new(ProductListWorker::new(network, config.pagination.page_size));

    // Event subscriber, independent of the list model
    let mut events = worker.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                Event::PageLoaded { page, added, total } => {
                    println!("[events] page {} added {} ({} total)", page, added, total);
                }
                Event::Exhausted { total } => {
                    println!("[events] catalog exhausted at {} products", total);
                }
                Event::PageFailed { page, error } => {
                    println!("[events] page {} failed: {}", page, error);
                }
                _ => {}
            }
        }
    });

    let model = ProductListModel::new(worker.clone(), &config.pagination);

    model.load_products().await?;

    // Scroll three more pages by "showing" the last cell each time
    for _ in 0..3 {
        let Some(last) = model.cells().last().map(|cell| cell.id()) else {
            break;
        };
        if let Err(e) = model.load_more_if_needed(last).await {
            println!("Load more failed: {}", e);
            break;
        }
    }

    let cells = model.cells();
    println!("{} products loaded, state {}", cells.len(), worker.state());
    for cell in cells.iter().take(5) {
        println!("  #{} {} | {} | {}", cell.id(), cell.title(), cell.price_label(), cell.quantity_label());
    }

    // Three cells become visible; the second scrolls away before its image arrives
    let visible: Vec<_> = cells.iter().take(3).cloned().collect();
    let loads: Vec<_> = visible
        .iter()
        .cloned()
        .map(|cell| tokio::spawn(async move { (cell.id(), cell.load_image().await) }))
        .collect();
    if let Some(cell) = visible.get(1) {
        // Cancel only once its load is actually in flight
        while cell.image_state() == ImageState::Idle {
            tokio::task::yield_now().await;
        }
        cell.cancel_image_loading();
    }

    for load in loads {
        let (id, state) = load.await?;
        match state {
            ImageState::Loaded(bytes) => println!("  image for #{}: {} bytes", id, bytes.len()),
            ImageState::Failed(message) => println!("  image for #{} failed: {}", id, message),
            ImageState::Idle => println!("  image for #{} cancelled", id),
            ImageState::Loading => {}
        }
    }

    model.refresh_products().await?;
    println!("After refresh: {} products", model.cells().len());

    Ok(())
}
