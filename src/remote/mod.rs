// Copyright 2026 The objcall Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Adapters binding remote operations to futures
//!
//! Method calls, service availability and signal emissions all surface as
//! `Future`s settled by whoever performs the operation. Handlers are looked
//! up in tables filled at startup rather than discovered at runtime.

pub use self::methods::MethodTable;
pub use self::registry::ServiceRegistry;
pub use self::signal::Signal;

pub mod methods;
pub mod registry;
pub mod signal;
