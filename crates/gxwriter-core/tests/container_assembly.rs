use std::io;

use gxwriter_core::{
    no_preview, Assembly, ContainerAssembler, ContainerHeader, GxError, HeaderConstants,
    OutputMode, PixelBuffer, PreviewOptions, Window, BITMAP_LEN, HEADER_LEN, PAYLOAD_OFFSET,
};

const GCODE: &str = ";FLAVOR:Marlin\n;TIME:3600\n;Filament used: 2.5m\n;Layer height:0.2\nG28 ; home °\nG1 X10 Y10 E1\n";

fn renderer(width: u32, height: u32) -> anyhow::Result<PixelBuffer> {
    Ok(PixelBuffer::filled(width, height, 0xFF_FF_00_00))
}

fn failing_renderer(_: u32, _: u32) -> anyhow::Result<PixelBuffer> {
    Err(anyhow::anyhow!("no OpenGL context"))
}

fn latin1(text: &str) -> Vec<u8> {
    text.chars().map(|c| c as u8).collect()
}

#[test]
fn test_container_layout() {
    let conversion = ContainerAssembler::default().assemble(GCODE, &mut renderer);
    let Assembly::Container(bytes) = &conversion.assembly else {
        panic!("expected container, got fallback");
    };

    assert_eq!(bytes.len(), PAYLOAD_OFFSET + latin1(GCODE).len());
    assert!(bytes[HEADER_LEN..PAYLOAD_OFFSET].iter().all(|&b| b == 0));
    assert_eq!(&bytes[PAYLOAD_OFFSET..], latin1(GCODE).as_slice());

    let header = ContainerHeader::parse(bytes).unwrap();
    assert_eq!(header.bitmap_offset as usize, HEADER_LEN);
    assert_eq!(header.payload_offset as usize, HEADER_LEN + BITMAP_LEN);
    assert_eq!(header.print_time_seconds, 3600);
    assert_eq!(header.filament_right, 250);
    assert_eq!(header.layer_height_microns, 200);
    assert_eq!(header.constants, HeaderConstants::default());
}

#[test]
fn test_preview_commands_are_encoded_but_not_embedded() {
    let conversion = ContainerAssembler::default().assemble(GCODE, &mut renderer);
    let commands = conversion.preview_commands.expect("preview was rendered");
    assert_eq!(commands, "M4010 X60 Y60\nM4010 I0 T3600 'f8203e10'\n");
    assert!(conversion.assembly.bytes()[HEADER_LEN..PAYLOAD_OFFSET]
        .iter()
        .all(|&b| b == 0));
}

#[test]
fn test_render_failure_still_produces_container() {
    let with_preview = ContainerAssembler::default().assemble(GCODE, &mut renderer);
    let without = ContainerAssembler::default().assemble(GCODE, &mut failing_renderer);
    assert!(without.assembly.is_container());
    assert!(without.preview_commands.is_none());
    assert_eq!(without.assembly, with_preview.assembly);

    let none = ContainerAssembler::default().assemble(GCODE, &mut no_preview);
    assert_eq!(none.assembly, with_preview.assembly);
}

#[test]
fn test_conversion_is_deterministic() {
    let assembler = ContainerAssembler::default();
    let first = assembler.assemble(GCODE, &mut renderer).assembly;
    let second = assembler.assemble(GCODE, &mut renderer).assembly;
    assert_eq!(first, second);
}

#[test]
fn test_bad_filament_falls_back_to_gcode() {
    let gcode = ";TIME:10\n;Filament used: ???\nG1 X1\n";
    let conversion = ContainerAssembler::default().assemble(gcode, &mut renderer);
    assert_eq!(conversion.assembly, Assembly::Fallback(latin1(gcode)));
}

#[test]
fn test_header_overflow_falls_back_to_gcode() {
    let gcode = ";Layer height:40\nG1 X1\n";
    let conversion = ContainerAssembler::default().assemble(gcode, &mut renderer);
    assert_eq!(conversion.assembly, Assembly::Fallback(latin1(gcode)));
    assert_eq!(conversion.metadata.unwrap().layer_height_microns, 40_000);
}

#[test]
fn test_encoder_failure_falls_back_to_gcode() {
    let preview = PreviewOptions {
        width: 60,
        height: 60,
        window: Window::new(100, 0, 160, 60),
    };
    let assembler = ContainerAssembler::new(HeaderConstants::default(), preview);
    let conversion = assembler.assemble(GCODE, &mut renderer);
    assert_eq!(conversion.assembly, Assembly::Fallback(latin1(GCODE)));
}

#[test]
fn test_unencodable_text_falls_back_lossy() {
    let gcode = ";TIME:10\n; part ✓\n";
    let conversion = ContainerAssembler::default().assemble(gcode, &mut renderer);
    assert_eq!(
        conversion.assembly,
        Assembly::Fallback(b";TIME:10\n; part ?\n".to_vec())
    );
}

#[test]
fn test_custom_constants_reach_header() {
    let constants = HeaderConstants {
        platform_temperature: 60,
        right_extruder_temperature: 210,
        ..Default::default()
    };
    let assembler = ContainerAssembler::new(constants, PreviewOptions::default());
    let bytes = assembler.assemble(GCODE, &mut renderer).assembly.into_bytes();
    let header = ContainerHeader::parse(&bytes).unwrap();
    assert_eq!(header.constants.platform_temperature, 60);
    assert_eq!(header.constants.right_extruder_temperature, 210);
    assert_eq!(&bytes[0x32..0x36], &[60, 0, 210, 0]);
}

#[test]
fn test_write_emits_container() {
    let mut out = Vec::new();
    let mut generator = |sink: &mut String| -> Result<(), String> {
        sink.push_str(GCODE);
        Ok(())
    };
    let report = ContainerAssembler::default()
        .write(&mut out, &mut generator, &mut renderer, OutputMode::Binary)
        .unwrap();

    assert!(report.container);
    assert_eq!(report.bytes_written, out.len());
    assert_eq!(&out[..12], b"xgcode 1.0\n\0");
    assert_eq!(report.metadata.unwrap().print_time_seconds, 3600);
}

#[test]
fn test_write_upstream_failure_passes_message() {
    let mut out = Vec::new();
    let mut generator =
        |_: &mut String| -> Result<(), String> { Err("Nothing to slice".to_string()) };
    let err = ContainerAssembler::default()
        .write(&mut out, &mut generator, &mut renderer, OutputMode::Binary)
        .unwrap_err();

    assert!(matches!(&err, GxError::UpstreamGeneration(msg) if msg == "Nothing to slice"));
    assert!(out.is_empty());
}

#[test]
fn test_write_rejects_text_mode() {
    let mut out = Vec::new();
    let mut called = false;
    let mut generator = |sink: &mut String| -> Result<(), String> {
        called = true;
        sink.push_str(GCODE);
        Ok(())
    };
    let err = ContainerAssembler::default()
        .write(&mut out, &mut generator, &mut renderer, OutputMode::Text)
        .unwrap_err();

    assert!(matches!(err, GxError::UnsupportedMode(OutputMode::Text)));
    assert!(out.is_empty());
    drop(generator);
    assert!(!called);
}

#[test]
fn test_write_fallback_still_succeeds() {
    let gcode = ";Filament used: n/a\nG1 X1\n";
    let mut out = Vec::new();
    let mut generator = |sink: &mut String| -> Result<(), String> {
        sink.push_str(gcode);
        Ok(())
    };
    let report = ContainerAssembler::default()
        .write(&mut out, &mut generator, &mut renderer, OutputMode::Binary)
        .unwrap();
    assert!(!report.container);
    assert_eq!(out, latin1(gcode));
}

struct BrokenSink;

impl io::Write for BrokenSink {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_write_surfaces_sink_errors() {
    let mut generator = |sink: &mut String| -> Result<(), String> {
        sink.push_str(GCODE);
        Ok(())
    };
    let err = ContainerAssembler::default()
        .write(&mut BrokenSink, &mut generator, &mut renderer, OutputMode::Binary)
        .unwrap_err();
    assert!(matches!(err, GxError::Io(_)));
}
