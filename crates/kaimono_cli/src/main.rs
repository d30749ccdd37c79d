//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `kaimono_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use kaimono_core::{MemoryKvStore, Placement, ShoppingListService};

fn main() {
    println!("kaimono_core ping={}", kaimono_core::ping());
    println!("kaimono_core version={}", kaimono_core::core_version());

    // In-memory first run: exercises seeding and section grouping only.
    let store = MemoryKvStore::new();
    let service = ShoppingListService::load(&store);
    for section in service.sections(Placement::ToBuy) {
        println!(
            "section category={} color={} items={}",
            section.category,
            section.color,
            section.items.len()
        );
    }
    println!(
        "kaimono_core seeded_items={} categories={}",
        service.items().len(),
        service.categories().len()
    );
}
