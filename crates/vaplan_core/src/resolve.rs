//! Rider parameter resolution
//!
//! Maps a (rider, income option) selection onto the flat parameter record the
//! projection consumes. Total by construction: unknown names select the first
//! rider or option, and a missing catalog yields the built-in fallback.

use crate::model::{
    OptionTables, ResolvedParameters, RiderCatalog, fallback_mawp_table, fallback_pip_table,
};

/// Resolve parameters for the selected rider and option.
///
/// * `None` catalog (or one with no riders) returns `ResolvedParameters::fallback()`
///   regardless of the selection.
/// * A rider name that matches nothing selects the catalog's first rider.
/// * An option the rider does not offer selects the rider's first option.
/// * An option without a table entry gets the fallback MAWP and PIP tables.
pub fn resolve_parameters(
    catalog: Option<&RiderCatalog>,
    rider_name: Option<&str>,
    option_name: Option<&str>,
) -> ResolvedParameters {
    let Some(catalog) = catalog else {
        return ResolvedParameters::fallback();
    };

    let named = rider_name.and_then(|name| catalog.rider_named(name));
    let Some(rider) = named.or_else(|| catalog.riders.first()) else {
        tracing::debug!("catalog has no riders; using fallback parameters");
        return ResolvedParameters::fallback();
    };
    if named.is_none() {
        tracing::debug!(
            requested = ?rider_name,
            selected = %rider.name,
            "rider not in catalog; selecting first rider"
        );
    }

    let option = option_name
        .filter(|o| rider.has_option(o))
        .or_else(|| rider.first_option());

    let tables = option
        .and_then(|o| rider.tables_for(o))
        .cloned()
        .unwrap_or_else(|| OptionTables {
            mawp_table: fallback_mawp_table(),
            pip_table: Some(fallback_pip_table()),
        });

    ResolvedParameters {
        product_name: catalog.product_name.clone(),
        rider_name: rider.name.clone(),
        credit_rate: rider.credit_rate,
        fee_rate: rider.fee_rate,
        max_credit_years: rider.max_credit_years,
        step_up_guarantee: rider.step_up_guarantee,
        rollup_mode: rider.rollup_mode,
        mawp_table: tables.mawp_table,
        pip_table: tables.pip_table,
        selected_option: option.map(str::to_string),
        from_api: true,
    }
}
