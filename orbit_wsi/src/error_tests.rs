//! Unit tests for error.rs
//!
//! Tests all Error variants and their implementations (Display, Debug, Clone, std::error::Error).

use crate::error::Error;

// ============================================================================
// ERROR DISPLAY TESTS
// ============================================================================

#[test]
fn test_initialization_failed_display() {
    let err = Error::InitializationFailed("surface creation failed".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Initialization failed"));
    assert!(display.contains("surface creation failed"));
}

#[test]
fn test_unsupported_surface_display() {
    let err = Error::UnsupportedSurface;
    let display = format!("{}", err);
    assert_eq!(display, "Surface not supported by the present queue");
}

#[test]
fn test_swapchain_unavailable_display() {
    let err = Error::SwapchainUnavailable;
    let display = format!("{}", err);
    assert_eq!(display, "Swapchain unavailable");
}

#[test]
fn test_present_failed_display() {
    let err = Error::PresentFailed;
    let display = format!("{}", err);
    assert_eq!(display, "Presentation failed");
}

#[test]
fn test_invalid_state_display() {
    let err = Error::InvalidState("begin_frame without set_external_frame".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Invalid state"));
    assert!(display.contains("begin_frame without set_external_frame"));
}

#[test]
fn test_backend_error_display() {
    let err = Error::BackendError("vkQueueSubmit failed".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Backend error"));
    assert!(display.contains("vkQueueSubmit failed"));
}

// ============================================================================
// ERROR TRAIT IMPLEMENTATIONS
// ============================================================================

#[test]
fn test_error_is_std_error() {
    let err = Error::SwapchainUnavailable;
    // Verify Error implements std::error::Error trait
    let _: &dyn std::error::Error = &err;
}

#[test]
fn test_error_debug() {
    let err1 = Error::BackendError("test".to_string());
    assert!(format!("{:?}", err1).contains("BackendError"));

    let err2 = Error::UnsupportedSurface;
    assert!(format!("{:?}", err2).contains("UnsupportedSurface"));

    let err3 = Error::PresentFailed;
    assert!(format!("{:?}", err3).contains("PresentFailed"));

    let err4 = Error::InitializationFailed("init".to_string());
    assert!(format!("{:?}", err4).contains("InitializationFailed"));
}

#[test]
fn test_error_clone_eq() {
    let err1 = Error::InvalidState("test".to_string());
    let err2 = err1.clone();
    assert_eq!(err1, err2);

    assert_ne!(Error::SwapchainUnavailable, Error::PresentFailed);
}
