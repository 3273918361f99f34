//! API integration tests for uploads and error handling.
//!
//! Tests verify:
//! - JPEG and PNG recompression end to end
//! - Error cases (missing file, bad type, oversized, corrupt, undecodable)
//! - HTTP response codes, headers and JSON bodies

use axum::body::Body;
use axum::http::{Request, StatusCode};
use image::GenericImageView;

use clap::Parser;
use fileforge::config::{Config, MIN_BODY_LIMIT};
use fileforge::{create_router, RouterConfig, UploadPipeline, MAX_UPLOAD_SIZE};

use super::test_utils::{
    create_palette_png, create_rgba_png, create_solid_jpeg, error_message, is_valid_jpeg,
    is_valid_png, multipart_body, send, send_to, upload_file, upload_request, Part,
};

// =============================================================================
// Successful Uploads
// =============================================================================

#[tokio::test]
async fn test_upload_red_jpeg() {
    let jpeg = create_solid_jpeg(100, 100, [255, 0, 0]);
    assert!(jpeg.len() < 1024 * 4);

    let (status, headers, body) = send(upload_file("red.jpg", &jpeg)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get("content-type").unwrap(), "image/jpeg");
    assert_eq!(
        headers.get("content-disposition").unwrap(),
        "attachment; filename=\"compressed_red.jpg\""
    );

    assert!(is_valid_jpeg(&body), "Response should be a valid JPEG");
    let img = image::load_from_memory(&body).unwrap();
    assert_eq!(img.dimensions(), (100, 100));

    // Still red after lossy recompression
    let px = img.to_rgb8().get_pixel(50, 50).0;
    assert!(px[0] > 200 && px[1] < 50 && px[2] < 50, "pixel was {:?}", px);
}

#[tokio::test]
async fn test_upload_rgba_png_keeps_alpha() {
    let png = create_rgba_png(100, 100);

    let (status, headers, body) = send(upload_file("icon.png", &png)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get("content-type").unwrap(), "image/png");
    assert_eq!(
        headers.get("content-disposition").unwrap(),
        "attachment; filename=\"compressed_icon.png\""
    );

    assert!(is_valid_png(&body));
    let img = image::load_from_memory_with_format(&body, image::ImageFormat::Png).unwrap();
    assert_eq!(img.dimensions(), (100, 100));
    assert!(img.color().has_alpha());

    let original = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(img.to_rgba8(), original, "PNG recompression must be lossless");
}

#[tokio::test]
async fn test_upload_rgba_png_named_jpeg_is_flattened() {
    let png = create_rgba_png(40, 30);

    let (status, headers, body) = send(upload_file("logo.jpeg", &png)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get("content-type").unwrap(), "image/jpeg");
    assert!(is_valid_jpeg(&body));

    let img = image::load_from_memory(&body).unwrap();
    assert!(!img.color().has_alpha());
    assert_eq!(img.dimensions(), (40, 30));
}

#[tokio::test]
async fn test_upload_palette_png_named_jpg_is_rgb() {
    for transparent in [false, true] {
        let data = create_palette_png(transparent);

        let (status, headers, body) = send(upload_file("pal.jpg", &data)).await;

        assert_eq!(status, StatusCode::OK, "transparent={}", transparent);
        assert_eq!(headers.get("content-type").unwrap(), "image/jpeg");
        assert!(is_valid_jpeg(&body));

        let img = image::load_from_memory(&body).unwrap();
        assert_eq!(img.color(), image::ColorType::Rgb8);
        assert_eq!(img.dimensions(), (4, 4));
    }
}

#[tokio::test]
async fn test_upload_palette_png_keeps_transparency() {
    let data = create_palette_png(true);

    let (status, headers, body) = send(upload_file("pal.png", &data)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get("content-type").unwrap(), "image/png");
    assert!(is_valid_png(&body));

    let img = image::load_from_memory(&body).unwrap();
    assert!(img.color().has_alpha());

    let rgba = img.to_rgba8();
    assert_eq!(rgba.get_pixel(0, 0).0, [255, 0, 0, 255]);
    assert_eq!(rgba.get_pixel(1, 0).0, [0, 255, 0, 128]);
    assert_eq!(rgba.get_pixel(2, 3)[3], 0);
    assert_eq!(rgba.get_pixel(3, 3).0, [255, 255, 255, 255]);
}

#[tokio::test]
async fn test_upload_uppercase_extension() {
    let jpeg = create_solid_jpeg(20, 20, [0, 128, 255]);

    let (status, headers, _) = send(upload_file("photo.JPG", &jpeg)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get("content-type").unwrap(), "image/jpeg");
    assert_eq!(
        headers.get("content-disposition").unwrap(),
        "attachment; filename=\"compressed_photo.jpg\""
    );
}

#[tokio::test]
async fn test_upload_filename_is_sanitized() {
    let jpeg = create_solid_jpeg(8, 8, [10, 10, 10]);

    let (status, headers, _) = send(upload_file("../my trip (1).jpg", &jpeg)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers.get("content-disposition").unwrap(),
        "attachment; filename=\"compressed_my_trip_1.jpg\""
    );
}

#[tokio::test]
async fn test_upload_ignores_other_fields() {
    let jpeg = create_solid_jpeg(16, 16, [0, 255, 0]);
    let body = multipart_body(&[
        Part::text("comment", b"hello"),
        Part::file("file", "green.jpg", &jpeg),
    ]);

    let (status, _, body) = send(upload_request(body)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(is_valid_jpeg(&body));
}

// =============================================================================
// Rejections
// =============================================================================

#[tokio::test]
async fn test_upload_text_file_rejected() {
    let (status, headers, body) = send(upload_file("notes.txt", b"just some notes")).await;

    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(headers.get("content-type").unwrap(), "application/json");
    assert_eq!(
        error_message(&body),
        "Invalid file type. Only JPG, JPEG, and PNG files are allowed."
    );
}

#[tokio::test]
async fn test_upload_oversized_jpeg_rejected() {
    // Valid JPEG header padded past the limit; the size check runs before
    // any image parsing
    let mut data = create_solid_jpeg(64, 64, [1, 2, 3]);
    data.resize(6 * 1024 * 1024, 0);
    assert!(data.len() as u64 > MAX_UPLOAD_SIZE);

    let (status, _, body) = send(upload_file("huge.jpg", &data)).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(error_message(&body), "File size exceeds 5 MB limit.");
}

#[tokio::test]
async fn test_upload_exactly_at_limit_is_not_too_large() {
    // Not an image, so it fails later, but not with 413
    let data = vec![0u8; MAX_UPLOAD_SIZE as usize];

    let (status, _, body) = send(upload_file("edge.png", &data)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        error_message(&body),
        "Invalid image file. The file is corrupted or not an image."
    );
}

#[tokio::test]
async fn test_upload_at_limit_with_smallest_body_limit() {
    let config = Config::try_parse_from([
        "fileforge".to_string(),
        "--body-limit".to_string(),
        MIN_BODY_LIMIT.to_string(),
    ])
    .unwrap();
    assert!(config.validate().is_ok());

    let router = create_router(
        UploadPipeline::new(),
        RouterConfig::new()
            .with_body_limit(config.body_limit)
            .with_tracing(false),
    );
    let data = vec![0u8; MAX_UPLOAD_SIZE as usize];

    let (status, _, body) = send_to(router, upload_file("edge.png", &data)).await;

    // Reaches the integrity check instead of being cut off by the router
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        error_message(&body),
        "Invalid image file. The file is corrupted or not an image."
    );
}

#[tokio::test]
async fn test_upload_body_limit_hit_before_file_part() {
    // Form field alone overflows the 10 MiB default body limit
    let filler = vec![b'x'; 11 * 1024 * 1024];
    let body = multipart_body(&[
        Part::text("notes", &filler),
        Part::file("file", "notes.txt", b"text"),
    ]);

    let (status, _, body) = send(upload_request(body)).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(error_message(&body), "File size exceeds 5 MB limit.");
}

#[tokio::test]
async fn test_upload_oversized_text_reports_type_first() {
    let data = vec![b'a'; 6 * 1024 * 1024];

    let (status, _, _) = send(upload_file("big.txt", &data)).await;

    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_upload_non_image_renamed_jpg() {
    let (status, _, body) = send(upload_file("fake.jpg", b"This is not an image at all")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        error_message(&body),
        "Invalid image file. The file is corrupted or not an image."
    );
}

#[tokio::test]
async fn test_upload_truncated_png_is_internal_error() {
    let png = create_rgba_png(128, 128);
    let truncated = &png[..png.len() / 2];

    let (status, _, body) = send(upload_file("half.png", truncated)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let message = error_message(&body);
    assert_eq!(
        message,
        "An internal error occurred while processing the image."
    );
}

#[tokio::test]
async fn test_upload_missing_file_part() {
    let body = multipart_body(&[Part::text("comment", b"no file here")]);

    let (status, _, body) = send(upload_request(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_message(&body), "No file part in the request");
}

#[tokio::test]
async fn test_upload_wrong_field_name() {
    let jpeg = create_solid_jpeg(8, 8, [0, 0, 0]);
    let body = multipart_body(&[Part::file("image", "a.jpg", &jpeg)]);

    let (status, _, body) = send(upload_request(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_message(&body), "No file part in the request");
}

#[tokio::test]
async fn test_upload_empty_filename() {
    let body = multipart_body(&[Part::file("file", "", b"")]);

    let (status, _, body) = send(upload_request(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_message(&body), "No file selected");
}

#[tokio::test]
async fn test_upload_without_multipart_body() {
    let request = Request::builder()
        .method("POST")
        .uri("/upload")
        .header("content-type", "application/json")
        .body(Body::from("{}"))
        .unwrap();

    let (status, _, body) = send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_message(&body), "No file part in the request");
}

#[tokio::test]
async fn test_upload_get_not_allowed() {
    let request = Request::builder()
        .method("GET")
        .uri("/upload")
        .body(Body::empty())
        .unwrap();

    let (status, _, _) = send(request).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let (status, _, body) = send(request).await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}
