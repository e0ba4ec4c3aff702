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

//! Implementations of the secondary ports

pub mod secondary {
    #[cfg(test)]
    pub(crate) mod canned_http;

    pub mod command {
        pub mod unix;

        pub use unix::*;
    }

    pub mod config {
        pub mod toml_file;

        pub use toml_file::*;
    }

    pub mod publisher {
        pub mod file;
        pub mod http;

        pub use file::*;
        pub use http::*;
    }

    pub mod system {
        pub mod linux;
        pub mod lspci;

        pub use linux::*;
        pub use lspci::*;
    }

    pub mod vendor {
        pub mod api;

        pub use api::*;
    }

    pub use command::*;
    pub use config::*;
    pub use publisher::*;
    pub use system::*;
    pub use vendor::*;
}

pub use secondary::*;
