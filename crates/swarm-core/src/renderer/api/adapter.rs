// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt;

/// Identification strings of the GPU the benchmark runs on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RendererAdapterInfo {
    /// Adapter (GPU) name as reported by the driver.
    pub name: String,
    /// Graphics API in use, e.g. `Vulkan` or `Gl`.
    pub backend: String,
    /// Device class, e.g. `DiscreteGpu`.
    pub device_type: String,
    /// Driver name and version string.
    pub driver: String,
}

impl fmt::Display for RendererAdapterInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.name, self.backend, self.device_type)?;
        if !self.driver.is_empty() {
            write!(f, " - {}", self.driver)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_omits_empty_driver() {
        let mut info = RendererAdapterInfo {
            name: "Mock GPU".into(),
            backend: "Vulkan".into(),
            device_type: "DiscreteGpu".into(),
            driver: String::new(),
        };
        assert_eq!(info.to_string(), "Mock GPU (Vulkan, DiscreteGpu)");
        info.driver = "mesa 24.1".into();
        assert_eq!(info.to_string(), "Mock GPU (Vulkan, DiscreteGpu) - mesa 24.1");
    }
}
