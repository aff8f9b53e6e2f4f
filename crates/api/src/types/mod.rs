//! Closed request and response schemas for the shipping backend.
//!
//! Every response is decoded into one of these types at the network boundary;
//! a body that does not match surfaces as `ApiError::InvalidResponse` instead
//! of flowing into the pages half-formed.

pub mod address;
pub mod admin;
pub mod auth;
pub mod common;
pub mod company;
pub mod notification;
pub mod order;
pub mod shipment;
pub mod tracking;
pub mod user;
pub mod wallet;

pub use address::{ClientAddress, ClientAddressInput};
pub use admin::{AdminStats, StatusCount};
pub use auth::{AccessToken, LoginResponse, Signup};
pub use common::{Ack, Data, ErrorBody, ListQuery, Paginated, Pagination, DEFAULT_PAGE_SIZE};
pub use company::{ParcelSize, ShippingCompany, ShippingType};
pub use notification::{Notification, NotificationScope};
pub use order::{Order, OrderCustomer};
pub use shipment::{
    AddressSnapshot, CreateShipmentRequest, CustomerAddressBlock, CustomerBlock, Dimensions,
    OrderBlock, Shipment, ShipmentStatistics,
};
pub use tracking::{TrackingEvent, TrackingResult};
pub use user::User;
pub use wallet::{BankTransfer, MyWallet, Receipt, Wallet, WalletOwner};
