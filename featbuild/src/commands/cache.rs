//! Cache maintenance.

use anyhow::Result;
use featbuild_core::feature::validate_feature_name;
use featbuild_core::CacheStore;

use crate::formatting::print_success;

use super::Context;

pub fn cmd_clean(ctx: &Context, feature: Option<&str>) -> Result<()> {
    let (loaded, _) = ctx.load()?;
    let store = ctx.cache_store(&loaded);

    if let Some(name) = feature {
        // Records of features no longer in the builder file can still be cleared.
        validate_feature_name(name)?;
    }
    store.clear(feature)?;

    match feature {
        Some(name) => print_success(&format!("Cleared cache record for {}", name)),
        None => print_success(&format!(
            "Cleared cache at {}",
            store.cache_dir().display()
        )),
    }

    Ok(())
}
