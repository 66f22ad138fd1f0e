use gxwriter_core::{MetadataError, MetadataScanner, PrintMetadata};

const CURA_HEADER: &str = ";FLAVOR:Marlin\n;TIME:6245\n;Filament used: 2.41m\n;Layer height:0.2\n;MINX:10.5\nG28\nG1 X10 Y10\n";

#[test]
fn test_scan_cura_header() {
    let metadata = MetadataScanner::new().scan(CURA_HEADER).unwrap();
    assert_eq!(
        metadata,
        PrintMetadata {
            print_time_seconds: 6245,
            filament_usage_centimeters: 241,
            layer_height_microns: 200,
        }
    );
}

#[test]
fn test_documented_examples() {
    let scanner = MetadataScanner::new();
    assert_eq!(
        scanner.scan(";Filament used: 2.5m").unwrap().filament_usage_centimeters,
        250
    );
    assert_eq!(scanner.scan(";TIME:123").unwrap().print_time_seconds, 123);
    assert_eq!(
        scanner.scan(";Layer height:0.2").unwrap().layer_height_microns,
        200
    );
}

#[test]
fn test_missing_markers_default_to_zero() {
    let metadata = MetadataScanner::new().scan("G28\nG1 X0 Y0\n").unwrap();
    assert_eq!(metadata, PrintMetadata::default());
    assert_eq!(MetadataScanner::new().scan("").unwrap(), PrintMetadata::default());
}

#[test]
fn test_last_marker_wins() {
    let gcode = ";TIME:100\n;Layer height:0.3\nG1 X1\n;TIME:250\n;Layer height:0.1\n";
    let metadata = MetadataScanner::new().scan(gcode).unwrap();
    assert_eq!(metadata.print_time_seconds, 250);
    assert_eq!(metadata.layer_height_microns, 100);
}

#[test]
fn test_later_unparseable_marker_resets_to_default() {
    let metadata = MetadataScanner::new().scan(";TIME:100\n;TIME:unknown\n").unwrap();
    assert_eq!(metadata.print_time_seconds, 0);
}

#[test]
fn test_number_must_follow_marker_directly() {
    let metadata = MetadataScanner::new()
        .scan(";TIME:100\n;TIME: 200\n;Layer height: 0.2\n")
        .unwrap();
    assert_eq!(metadata.print_time_seconds, 0);
    assert_eq!(metadata.layer_height_microns, 0);
}

#[test]
fn test_time_is_truncated() {
    let metadata = MetadataScanner::new().scan(";TIME:99.9\n").unwrap();
    assert_eq!(metadata.print_time_seconds, 99);
}

#[test]
fn test_negative_values_are_kept() {
    let metadata = MetadataScanner::new()
        .scan(";TIME:-5\n;Layer height:-0.2\n")
        .unwrap();
    assert_eq!(metadata.print_time_seconds, -5);
    assert_eq!(metadata.layer_height_microns, -200);
}

#[test]
fn test_markers_must_start_the_line() {
    let metadata = MetadataScanner::new()
        .scan("G1 X1 ;TIME:500\n  ;Layer height: 0.2\n")
        .unwrap();
    assert_eq!(metadata, PrintMetadata::default());
}

#[test]
fn test_crlf_line_endings() {
    let gcode = ";TIME:42\r\n;Filament used: 1.25m\r\n;Layer height:0.16\r\n";
    let metadata = MetadataScanner::new().scan(gcode).unwrap();
    assert_eq!(metadata.print_time_seconds, 42);
    assert_eq!(metadata.filament_usage_centimeters, 125);
    assert_eq!(metadata.layer_height_microns, 160);
}

#[test]
fn test_unparseable_filament_is_an_error() {
    let err = MetadataScanner::new()
        .scan(";TIME:10\n;Filament used: unknown\n")
        .unwrap_err();
    assert_eq!(
        err,
        MetadataError::InvalidFilament {
            line: ";Filament used: unknown".to_string()
        }
    );
}

#[test]
fn test_non_finite_filament_is_an_error() {
    let err = MetadataScanner::new().scan(";Filament used: inf\n").unwrap_err();
    assert!(matches!(err, MetadataError::NonFinite { .. }));
}
