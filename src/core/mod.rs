/// Split aggregation - current and overall balances with settled state
pub mod aggregate;
/// Allocation engine - shares, efficiencies, discount and chart slices
pub mod allocation;
/// Split collection CRUD and selection
pub mod collection;
/// Rounding and form-input amounts
pub mod money;
/// Plain-text rendering of splits and balances
pub mod report;
/// Session state with import and export
pub mod session;
/// Settlement derivation and the settled-state registry
pub mod settlement;
/// Slugs and shareable paths
pub mod slug;
/// Split and person records
pub mod split;
/// Load and save of the persisted records
pub mod storage;
