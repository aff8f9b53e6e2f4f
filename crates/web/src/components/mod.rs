//! Reusable view-model pieces shared by several pages.

pub mod table;

pub use table::{
    FilterOption, Pager, TableAction, TableColumn, TableState, shipment_status_filter,
    shipment_status_options,
};
