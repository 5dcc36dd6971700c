//! Browser and device descriptors.
//!
//! Mirrors the descriptor registry of the external test engine: each entry
//! carries the emulation settings a project needs to target that browser or
//! device.

use serde::{Deserialize, Serialize};

/// Viewport dimensions in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Emulation settings for one browser or device target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDescriptor {
    pub user_agent: String,
    pub viewport: Viewport,
    pub device_scale_factor: f64,
    pub is_mobile: bool,
    pub has_touch: bool,
    pub default_browser_type: String,
}

fn desktop(user_agent: &str, browser_type: &str) -> DeviceDescriptor {
    DeviceDescriptor {
        user_agent: user_agent.to_string(),
        viewport: Viewport {
            width: 1280,
            height: 720,
        },
        device_scale_factor: 1.0,
        is_mobile: false,
        has_touch: false,
        default_browser_type: browser_type.to_string(),
    }
}

/// Desktop Chrome descriptor.
pub fn desktop_chrome() -> DeviceDescriptor {
    desktop(
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.6045.9 Safari/537.36",
        "chromium",
    )
}

/// Desktop Firefox descriptor.
pub fn desktop_firefox() -> DeviceDescriptor {
    desktop(
        "Mozilla/5.0 (X11; Linux x86_64; rv:119.0) Gecko/20100101 Firefox/119.0",
        "firefox",
    )
}

/// Desktop Safari descriptor.
pub fn desktop_safari() -> DeviceDescriptor {
    desktop(
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Safari/605.1.15",
        "webkit",
    )
}

/// Desktop Edge descriptor.
pub fn desktop_edge() -> DeviceDescriptor {
    desktop(
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.6045.9 Safari/537.36 Edg/119.0.2151.46",
        "chromium",
    )
}

/// Pixel 5 descriptor.
pub fn pixel_5() -> DeviceDescriptor {
    DeviceDescriptor {
        user_agent: "Mozilla/5.0 (Linux; Android 11; Pixel 5) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.6045.9 Mobile Safari/537.36".to_string(),
        viewport: Viewport {
            width: 393,
            height: 851,
        },
        device_scale_factor: 2.75,
        is_mobile: true,
        has_touch: true,
        default_browser_type: "chromium".to_string(),
    }
}

/// iPhone 12 descriptor.
pub fn iphone_12() -> DeviceDescriptor {
    DeviceDescriptor {
        user_agent: "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1".to_string(),
        viewport: Viewport {
            width: 390,
            height: 844,
        },
        device_scale_factor: 3.0,
        is_mobile: true,
        has_touch: true,
        default_browser_type: "webkit".to_string(),
    }
}

/// Known device names.
pub const DEVICE_NAMES: &[&str] = &[
    "Desktop Chrome",
    "Desktop Firefox",
    "Desktop Safari",
    "Desktop Edge",
    "Pixel 5",
    "iPhone 12",
];

/// Looks up a descriptor by registry name.
pub fn device(name: &str) -> Option<DeviceDescriptor> {
    match name {
        "Desktop Chrome" => Some(desktop_chrome()),
        "Desktop Firefox" => Some(desktop_firefox()),
        "Desktop Safari" => Some(desktop_safari()),
        "Desktop Edge" => Some(desktop_edge()),
        "Pixel 5" => Some(pixel_5()),
        "iPhone 12" => Some(iphone_12()),
        _ => None,
    }
}
