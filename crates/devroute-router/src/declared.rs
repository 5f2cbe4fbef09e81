//! The device management UI's route table
//!
//! `/` renders the default container and redirects to the device list.
//! Both device views are nested under it and receive path params as props.

use crate::route::RouteDeclaration;

pub const HOME: &str = "Home";
pub const DEVICES: &str = "Devices";
pub const NEWDEVICE: &str = "Newdevice";

/// View identifier of the layout container wrapping every page
pub const DEFAULT_CONTAINER: &str = "DefaultContainer";

/// Every view identifier referenced by [`routes`]
pub const VIEW_IDS: [&str; 3] = [DEFAULT_CONTAINER, DEVICES, NEWDEVICE];

pub fn routes() -> Vec<RouteDeclaration> {
    vec![RouteDeclaration::new("/", HOME)
        .with_view(DEFAULT_CONTAINER)
        .with_redirect("/devices")
        .with_props(true)
        .with_children([
            RouteDeclaration::new("devices", DEVICES)
                .with_view(DEVICES)
                .with_props(true),
            RouteDeclaration::new("newdevice", NEWDEVICE)
                .with_view(NEWDEVICE)
                .with_props(true),
        ])]
}
