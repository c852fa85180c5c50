use super::{control_change_bytes, note_off_bytes, note_on_bytes, MidiSink};
use crate::error::MidiError;
use midir::{MidiOutput, MidiOutputConnection, MidiOutputPort};
use std::io::{stdin, stdout, Write};
use std::sync::Mutex;

/// MIDI output port opened through midir.
pub struct MidirSink {
    connection: Mutex<MidiOutputConnection>,
    port_name: String,
}

impl MidirSink {
    /// Opens the first port whose name contains `wanted`, or asks on stdin
    /// when no name is given.
    pub fn open(wanted: Option<&str>) -> Result<Self, MidiError> {
        let midi_out =
            MidiOutput::new("Luma Xylophone Output").map_err(|e| MidiError::Init(e.to_string()))?;
        let port = match wanted {
            Some(name) => Self::find_output_port(&midi_out, name)?,
            None => Self::select_output_port(&midi_out)?,
        };
        let port_name = midi_out
            .port_name(&port)
            .map_err(|e| MidiError::Init(e.to_string()))?;

        let connection = midi_out
            .connect(&port, "luma-xylophone-out")
            .map_err(|e| MidiError::Connect(e.to_string()))?;

        log::info!("Opened MIDI port: {}", port_name);

        Ok(Self {
            connection: Mutex::new(connection),
            port_name,
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    fn find_output_port(midi_out: &MidiOutput, wanted: &str) -> Result<MidiOutputPort, MidiError> {
        let wanted_lower = wanted.to_lowercase();
        midi_out
            .ports()
            .into_iter()
            .find(|port| {
                midi_out
                    .port_name(port)
                    .map(|name| name.to_lowercase().contains(&wanted_lower))
                    .unwrap_or(false)
            })
            .ok_or_else(|| MidiError::InvalidSelection(wanted.to_string()))
    }

    fn select_output_port(midi_out: &MidiOutput) -> Result<MidiOutputPort, MidiError> {
        let out_ports = midi_out.ports();
        if out_ports.is_empty() {
            return Err(MidiError::NoPorts);
        }

        println!("Available MIDI output ports:");
        for (i, port) in out_ports.iter().enumerate() {
            let name = midi_out.port_name(port).unwrap_or_default();
            println!("{}: {}", i, name);
        }

        print!("Select MIDI output port: ");
        stdout().flush().map_err(|e| MidiError::Init(e.to_string()))?;
        let mut input = String::new();
        stdin()
            .read_line(&mut input)
            .map_err(|e| MidiError::Init(e.to_string()))?;
        let selection = input.trim().parse::<usize>().unwrap_or(0);

        out_ports
            .get(selection)
            .cloned()
            .ok_or_else(|| MidiError::InvalidSelection(input.trim().to_string()))
    }

    fn send(&self, message: &[u8]) -> Result<(), MidiError> {
        let mut connection = self
            .connection
            .lock()
            .map_err(|_| MidiError::Send("connection lock poisoned".into()))?;
        connection
            .send(message)
            .map_err(|e| MidiError::Send(e.to_string()))
    }
}

impl MidiSink for MidirSink {
    fn note_on(&self, channel: u8, note: u8, velocity: u8) -> Result<(), MidiError> {
        self.send(&note_on_bytes(channel, note, velocity))
    }

    fn note_off(&self, channel: u8, note: u8) -> Result<(), MidiError> {
        self.send(&note_off_bytes(channel, note))
    }

    fn control_change(&self, channel: u8, control: u8, value: u8) -> Result<(), MidiError> {
        self.send(&control_change_bytes(channel, control, value))
    }
}
