//! Output formatting for CLI responses

use anyhow::Error;
use colored::*;
use gcadapter_hid_common::HidDeviceInfo;
use gcadapter_hid_wup028_protocol::{ConnectionKind, GcControllerState, PortIndex};
use serde_json::{Value, json};

/// Print error in JSON format
pub fn print_error_json(error: &Error) {
    let error_json = json!({
        "success": false,
        "error": {
            "message": error.to_string(),
            "type": error_type_name(error)
        }
    });
    match serde_json::to_string_pretty(&error_json) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("Failed to format error as JSON: {}", e),
    }
}

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);

    let mut source = error.source();
    while let Some(err) = source {
        eprintln!("  {} {}", "Caused by:".yellow(), err);
        source = err.source();
    }
}

/// Print the attached adapters
pub fn print_adapter_list(adapters: &[HidDeviceInfo], json: bool) {
    if json {
        let output = json!({
            "success": true,
            "adapters": adapters
        });
        match serde_json::to_string_pretty(&output) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("Failed to format adapter list as JSON: {}", e),
        }
        return;
    }

    if adapters.is_empty() {
        println!("{}", "No adapters found".yellow());
        return;
    }

    println!("{}", "Connected Adapters:".bold());
    for adapter in adapters {
        println!(
            "  {} {} ({})",
            "●".green(),
            adapter.display_name().bold(),
            adapter.path.dimmed()
        );
        if let Some(serial) = &adapter.serial_number {
            println!("    Serial: {}", serial);
        }
        if let Some(version) = adapter.version {
            println!("    Version: {:#06x}", version);
        }
    }
}

/// Hex dump, sixteen bytes per line.
pub fn hex_lines(bytes: &[u8]) -> Vec<String> {
    bytes
        .chunks(16)
        .map(|chunk| {
            chunk
                .iter()
                .map(|b| format!("{:02x}", b))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

pub fn print_descriptor(descriptor: &[u8], json: bool) {
    if json {
        let output = json!({
            "success": true,
            "length": descriptor.len(),
            "descriptor": descriptor
        });
        match serde_json::to_string_pretty(&output) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("Failed to format descriptor as JSON: {}", e),
        }
    } else {
        println!(
            "{} ({} bytes)",
            "Virtual port report descriptor".bold(),
            descriptor.len()
        );
        for (row, line) in hex_lines(descriptor).iter().enumerate() {
            println!("  {} {}", format!("{:04x}", row * 16).dimmed(), line);
        }
    }
}

fn connection_name(kind: ConnectionKind) -> String {
    match kind {
        ConnectionKind::Disconnected => "disconnected".to_string(),
        ConnectionKind::Wired => "wired".to_string(),
        ConnectionKind::Wireless => "wireless".to_string(),
        ConnectionKind::Other(nibble) => format!("type {:#x}", nibble),
    }
}

pub fn state_json(port: PortIndex, timestamp: u64, state: &GcControllerState) -> Value {
    json!({
        "event": "state",
        "port": port.number(),
        "timestamp_us": timestamp,
        "connection": connection_name(state.connection),
        "buttons": state.buttons.pressed(),
        "stick": [state.stick_x, state.stick_y],
        "c_stick": [state.c_stick_x, state.c_stick_y],
        "triggers": [state.trigger_left, state.trigger_right]
    })
}

pub fn state_line(port: PortIndex, state: &GcControllerState) -> String {
    let buttons = state.buttons.pressed();
    let buttons = if buttons.is_empty() {
        "-".to_string()
    } else {
        buttons.join("+")
    };
    format!(
        "[P{}] stick {:>4},{:>4}  c {:>4},{:>4}  L {:>3} R {:>3}  {}",
        port.number(),
        state.stick_x,
        state.stick_y,
        state.c_stick_x,
        state.c_stick_y,
        state.trigger_left,
        state.trigger_right,
        buttons
    )
}

pub fn port_event_json(port: PortIndex, connected: bool) -> Value {
    json!({
        "event": if connected { "connected" } else { "disconnected" },
        "port": port.number()
    })
}

pub fn port_event_line(port: PortIndex, connected: bool) -> String {
    if connected {
        format!("{} Port {} connected", "+".green(), port.number())
    } else {
        format!("{} Port {} disconnected", "-".red(), port.number())
    }
}

/// Print success message
pub fn print_success(message: &str, json: bool) {
    if json {
        let output = json!({
            "success": true,
            "message": message
        });
        match serde_json::to_string_pretty(&output) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("Failed to format success message as JSON: {}", e),
        }
    } else {
        println!("{} {}", "✓".green(), message);
    }
}

fn error_type_name(error: &Error) -> String {
    format!("{:?}", error)
        .split('(')
        .next()
        .unwrap_or("Unknown")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcadapter_hid_wup028_protocol::GcButtons;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn port(index: u8) -> Result<PortIndex, String> {
        PortIndex::new(index).ok_or_else(|| format!("bad port {index}"))
    }

    fn sample_state() -> GcControllerState {
        GcControllerState {
            connection: ConnectionKind::Wired,
            buttons: GcButtons(GcButtons::A | GcButtons::Z),
            stick_x: -12,
            stick_y: 40,
            c_stick_x: 0,
            c_stick_y: 0,
            trigger_left: 30,
            trigger_right: 0,
        }
    }

    #[test]
    fn hex_lines_wrap_at_sixteen() {
        let bytes: Vec<u8> = (0u8..20).collect();
        let lines = hex_lines(&bytes);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("00 01 02"));
        assert_eq!(lines[1], "10 11 12 13");
    }

    #[test]
    fn state_json_uses_one_based_port() -> TestResult {
        let value = state_json(port(2)?, 1234, &sample_state());
        assert_eq!(value["port"], 3);
        assert_eq!(value["timestamp_us"], 1234);
        assert_eq!(value["connection"], "wired");
        assert_eq!(value["buttons"], json!(["A", "Z"]));
        assert_eq!(value["stick"], json!([-12, 40]));
        Ok(())
    }

    #[test]
    fn state_line_lists_pressed_buttons() -> TestResult {
        let line = state_line(port(0)?, &sample_state());
        assert!(line.starts_with("[P1]"));
        assert!(line.contains("A+Z"));
        assert!(line.contains("-12"));

        let idle = GcControllerState {
            buttons: GcButtons(0),
            ..sample_state()
        };
        assert!(state_line(port(0)?, &idle).ends_with('-'));
        Ok(())
    }

    #[test]
    fn port_events() -> TestResult {
        assert_eq!(port_event_json(port(3)?, true)["event"], "connected");
        assert_eq!(port_event_json(port(3)?, false)["port"], 4);
        Ok(())
    }
}
