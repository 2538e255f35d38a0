//! Status command implementation

use anyhow::Result;
use serde_json::json;

use consorcio_core::config::{STORE_KEY_ENV, STORE_URL_ENV};
use consorcio_core::StoreClient;

use super::store_from_env;

pub async fn cmd_status(json: bool) -> Result<()> {
    // Report missing configuration as status output, not as a crash.
    let store = match store_from_env() {
        Ok(store) => store,
        Err(e) => {
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "configured": false,
                        "error": e.to_string(),
                    }))?
                );
            } else {
                println!();
                println!("📊 Consorcio Status");
                println!("   ❌ Not configured: {:#}", e);
                println!("      Set {} and {}", STORE_URL_ENV, STORE_KEY_ENV);
                println!();
            }
            return Ok(());
        }
    };

    cmd_status_with(&store, json).await
}

pub async fn cmd_status_with(store: &StoreClient, json: bool) -> Result<()> {
    let reachable = store.health_check().await;
    let buildings = if reachable {
        store.list_buildings(None).await.map(|b| b.len()).ok()
    } else {
        None
    };
    let providers = if reachable {
        store.list_providers().await.map(|p| p.len()).ok()
    } else {
        None
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "configured": true,
                "store_url": store.base_url(),
                "reachable": reachable,
                "buildings": buildings,
                "providers": providers,
            }))?
        );
        return Ok(());
    }

    println!();
    println!("📊 Consorcio Status");
    println!("   ─────────────────────────────────────────");
    println!("   Data store: {}", store.base_url());
    println!("   Credentials: {}=***", STORE_KEY_ENV);
    if reachable {
        println!("   ✅ Store: reachable");
        if let Some(count) = buildings {
            println!("   Buildings: {}", count);
        }
        if let Some(count) = providers {
            println!("   Providers: {}", count);
        }
    } else {
        println!("   ❌ Store: not responding");
        println!("      (Check {} and network access)", STORE_URL_ENV);
    }
    println!();

    Ok(())
}
