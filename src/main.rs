use bpnode::{Node, RamNv, SimPins};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Paragraph, Row, Table},
    Frame, Terminal,
};
use std::io::{self, BufRead, Read, Write};
use std::thread;
use std::time::{Duration, Instant};

/// Scheduler tick for the listening loops. Work is measured each
/// iteration and only the remainder is slept, so a slow iteration is
/// absorbed instead of compounding.
const TICK: Duration = Duration::from_millis(10);

type SimNode = Node<SimPins, RamNv>;

// The main entry point for the node command-line tool.
fn main() {
    pretty_env_logger::init();

    println!("==========================");
    println!("  Backplane I/O Node CLI  ");
    println!("==========================");

    // Prompt for the unit address the hardware straps would provide.
    print!("Enter unit address (decimal, default: 7): ");
    io::stdout().flush().unwrap();

    let mut addr_input = String::new();
    io::stdin().read_line(&mut addr_input).unwrap();

    let unit_address = match addr_input.trim() {
        "" => 7,
        s => s.parse().unwrap_or_else(|_| {
            eprintln!("[WARNING] Invalid address '{}'. Using default 7.", s);
            7
        }),
    };

    let mut node = Node::new(SimPins::with_address(unit_address), RamNv::default());

    println!("Node started with unit address {}", node.unit_id());
    println!("Send '++ADDR {}' to activate it.", node.unit_id());

    // Main menu loop.
    loop {
        println!("\nSelect mode:");
        println!("  1. Manual Command Input");
        println!("  2. Listen on Serial Port");
        println!("  3. Channel Monitor");
        println!("  4. Exit");
        print!("> ");
        io::stdout().flush().unwrap();

        let mut choice = String::new();
        io::stdin().read_line(&mut choice).unwrap();

        match choice.trim() {
            "1" => run_manual_mode(&mut node),
            "2" => run_serial_mode(&mut node),
            "3" => run_monitor_mode(&mut node),
            "4" => break,
            _ => eprintln!("[ERROR] Invalid choice. Please enter 1, 2, 3, or 4."),
        }
    }
}

// Handles the manual command input mode.
fn run_manual_mode(node: &mut SimNode) {
    println!("\n--- Manual Mode ---");
    println!("Enter commands, or type 'back' to return to the main menu.");
    print!("> ");
    io::stdout().flush().unwrap();

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let input = line.unwrap();
        let command = input.trim();

        if command == "back" {
            break;
        }

        if !command.is_empty() {
            if let Some(reply) = node.dispatch(command) {
                for part in reply.lines() {
                    println!("< {}", part);
                }
            }
        }
        print!("> ");
        io::stdout().flush().unwrap();
    }
}

// Handles the serial port listening mode.
fn run_serial_mode(node: &mut SimNode) {
    println!("\n--- Serial Mode ---");

    // List available serial ports.
    let ports = match serialport::available_ports() {
        Ok(ports) => ports,
        Err(e) => {
            eprintln!("[ERROR] Could not enumerate serial ports: {}", e);
            return;
        }
    };

    if ports.is_empty() {
        eprintln!("[ERROR] No serial ports found.");
        return;
    }

    println!("Available serial ports:");
    for (i, port) in ports.iter().enumerate() {
        println!("  {}: {}", i, port.port_name);
    }

    // Get user's choice of serial port.
    print!("Select a port (number): ");
    io::stdout().flush().unwrap();
    let mut port_choice = String::new();
    io::stdin().read_line(&mut port_choice).unwrap();
    let port_index: usize = match port_choice.trim().parse() {
        Ok(i) if i < ports.len() => i,
        _ => {
            eprintln!("[ERROR] Invalid port selection.");
            return;
        }
    };
    let port_name = &ports[port_index].port_name;

    // Get user's choice of baud rate.
    let baud_rates: [u32; 5] = [9600, 19200, 38400, 57600, 115200];
    println!("Available baud rates:");
    for (i, &rate) in baud_rates.iter().enumerate() {
        println!("  {}: {}", i, rate);
    }
    print!("Select a baud rate (number): ");
    io::stdout().flush().unwrap();
    let mut baud_choice = String::new();
    io::stdin().read_line(&mut baud_choice).unwrap();
    let baud_index: usize = match baud_choice.trim().parse() {
        Ok(i) if i < baud_rates.len() => i,
        _ => {
            eprintln!("[ERROR] Invalid baud rate selection.");
            return;
        }
    };
    let baud_rate = baud_rates[baud_index];

    // Open the selected serial port with a short read timeout so the tick
    // loop keeps its cadence even when the link is idle.
    let mut port = match serialport::new(port_name, baud_rate)
        .timeout(Duration::from_millis(1))
        .open()
    {
        Ok(port) => port,
        Err(e) => {
            eprintln!("[ERROR] Failed to open port '{}': {}", port_name, e);
            return;
        }
    };

    println!(
        "\nListening on {} at {} baud. Press Ctrl+C to exit.",
        port_name, baud_rate
    );

    let mut raw = [0u8; 128];
    let mut pending = String::new();
    loop {
        let started = Instant::now();

        match port.read(&mut raw) {
            Ok(n) if n > 0 => {
                pending.push_str(&String::from_utf8_lossy(&raw[..n]));
                for line in drain_lines(&mut pending) {
                    log::info!("received: {}", line);
                    if let Some(reply) = node.dispatch(&line) {
                        log::info!("reply: {}", reply);
                        if let Err(e) = port.write_all(format!("{}\r\n", reply).as_bytes()) {
                            log::error!("failed to write to serial port: {}", e);
                        }
                    }
                }
            }
            Ok(_) => (),
            Err(ref e) if e.kind() == io::ErrorKind::TimedOut => (),
            Err(e) => log::error!("serial port error: {}", e),
        }

        node.tick();

        // Sleep whatever is left of the tick; a long iteration just runs
        // straight into the next one.
        if let Some(remaining) = TICK.checked_sub(started.elapsed()) {
            thread::sleep(remaining);
        }
    }
}

// Handles the interactive channel monitor mode.
fn run_monitor_mode(node: &mut SimNode) {
    if let Err(e) = monitor_loop(node) {
        let _ = disable_raw_mode();
        let _ = io::stdout().execute(LeaveAlternateScreen);
        eprintln!("[ERROR] Monitor failed: {}", e);
    }
}

fn monitor_loop(node: &mut SimNode) -> io::Result<()> {
    enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    let mut input = String::new();
    let mut history: Vec<String> = Vec::new();

    loop {
        let started = Instant::now();

        terminal.draw(|frame| draw_monitor(frame, node, &input, &history))?;

        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Esc => {
                        disable_raw_mode()?;
                        io::stdout().execute(LeaveAlternateScreen)?;
                        return Ok(());
                    }
                    KeyCode::Enter => {
                        let line = input.trim().to_string();
                        input.clear();
                        if line.is_empty() {
                            continue;
                        }
                        history.push(format!("> {}", line));
                        if let Some(reply) = node.dispatch(&line) {
                            for part in reply.lines() {
                                history.push(format!("< {}", part));
                            }
                        }
                        let overflow = history.len().saturating_sub(100);
                        if overflow > 0 {
                            history.drain(..overflow);
                        }
                    }
                    KeyCode::Backspace => {
                        input.pop();
                    }
                    KeyCode::Char(c) => input.push(c),
                    _ => {}
                }
            }
        }

        node.tick();

        if let Some(remaining) = TICK.checked_sub(started.elapsed()) {
            thread::sleep(remaining);
        }
    }
}

fn draw_monitor(frame: &mut Frame, node: &SimNode, input: &str, history: &[String]) {
    let areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(11),
            Constraint::Length(7),
            Constraint::Min(4),
            Constraint::Length(3),
        ])
        .split(frame.size());

    let header_style = Style::default().add_modifier(Modifier::BOLD);
    let status = format!(
        "unit {} ({})",
        node.unit_id(),
        if node.is_active() { "ACTIVE" } else { "inactive" }
    );

    let digital_rows: Vec<Row> = node
        .channels()
        .digital
        .iter()
        .enumerate()
        .map(|(i, ch)| {
            Row::new(vec![
                format!("DIO{}", i + 1),
                ch.mode.keyword().to_string(),
                String::from(if node.read_digital(i) { "1" } else { "0" }),
            ])
        })
        .collect();
    let digital = Table::new(
        digital_rows,
        [
            Constraint::Length(6),
            Constraint::Length(14),
            Constraint::Length(5),
        ],
    )
    .header(Row::new(vec!["chan", "mode", "level"]).style(header_style))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("digital {}", status)),
    );
    frame.render_widget(digital, areas[0]);

    let analog_rows: Vec<Row> = node
        .channels()
        .analog
        .iter()
        .enumerate()
        .map(|(i, ch)| {
            Row::new(vec![
                format!("AIO{}", i + 1),
                ch.mode.keyword().to_string(),
                format!("{:.3}", node.read_analog(i)),
            ])
        })
        .collect();
    let analog = Table::new(
        analog_rows,
        [
            Constraint::Length(6),
            Constraint::Length(14),
            Constraint::Length(7),
        ],
    )
    .header(Row::new(vec!["chan", "mode", "value"]).style(header_style))
    .block(Block::default().borders(Borders::ALL).title("analog"));
    frame.render_widget(analog, areas[1]);

    // Show the newest traffic that fits the pane.
    let visible = areas[2].height.saturating_sub(2) as usize;
    let start = history.len().saturating_sub(visible);
    let items: Vec<ListItem> = history[start..]
        .iter()
        .map(|line| ListItem::new(line.as_str()))
        .collect();
    let traffic = List::new(items).block(Block::default().borders(Borders::ALL).title("traffic"));
    frame.render_widget(traffic, areas[2]);

    let prompt = Paragraph::new(format!("> {}", input)).block(
        Block::default()
            .borders(Borders::ALL)
            .title("command (Esc to leave)"),
    );
    frame.render_widget(prompt, areas[3]);
}

// Splits the receive buffer into complete lines, leaving any unterminated
// tail in place for the next read.
fn drain_lines(pending: &mut String) -> Vec<String> {
    let mut lines = Vec::new();
    while let Some(pos) = pending.find(|c| c == '\r' || c == '\n') {
        let line: String = pending.drain(..=pos).collect();
        let line = line.trim().to_string();
        if !line.is_empty() {
            lines.push(line);
        }
    }
    lines
}
