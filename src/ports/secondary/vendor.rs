/*
Copyright 2024 San Francisco Compute Company

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

use crate::domain::{LookupError, VendorRef};
use async_trait::async_trait;

/// Secondary port - Vendor catalog
///
/// Maps a vendor display name to the canonical vendor entry known to the
/// community database.
#[async_trait]
pub trait VendorCatalog: Send + Sync {
    /// Find the first catalog entry matching a vendor name
    ///
    /// # Arguments
    /// * `name` - Vendor name as read from DMI
    ///
    /// # Returns
    /// * `Ok(Some(VendorRef))` - Canonical name and vendor ID
    /// * `Ok(None)` - The catalog has no match
    /// * `Err(LookupError)` - The catalog could not be queried
    async fn find_vendor(&self, name: &str) -> Result<Option<VendorRef>, LookupError>;
}
