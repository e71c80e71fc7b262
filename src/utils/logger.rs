use colored::*;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use chrono::Local;

/// Severity vocabulary of wallet-labelled log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    fn label(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Success => "SUCCESS",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }
}

pub struct Logger;

impl Logger {
    fn get_logs_dir() -> PathBuf {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join("logs")
    }

    fn get_log_file_name() -> PathBuf {
        let date = Local::now().format("%Y-%m-%d").to_string();
        Self::get_logs_dir().join(format!("bot-{}.log", date))
    }

    fn ensure_logs_dir() {
        let logs_dir = Self::get_logs_dir();
        if !logs_dir.exists() {
            let _ = fs::create_dir_all(&logs_dir);
        }
    }

    fn write_to_file(message: &str) {
        if let Err(_) = (|| -> std::io::Result<()> {
            Self::ensure_logs_dir();
            let log_file = Self::get_log_file_name();
            let timestamp = Local::now().to_rfc3339();
            let log_entry = format!("[{}] {}\n", timestamp, message);

            let mut file = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_file)?;
            file.write_all(log_entry.as_bytes())?;
            Ok(())
        })() {
            // Silently fail to avoid infinite loops
        }
    }

    pub fn format_address(address: &str) -> String {
        if address.len() >= 10 {
            format!("{}...{}", &address[..6], &address[address.len() - 4..])
        } else {
            address.to_string()
        }
    }

    fn mask_address(address: &str) -> String {
        if address.len() >= 10 {
            format!("{}****{}", &address[..6], &address[address.len() - 4..])
        } else {
            address.to_string()
        }
    }

    /// `[HH:MM:SS] [current/total] message`, coloured by level.
    pub fn format_wallet_line(current: usize, total: usize, message: &str) -> String {
        let timestamp = Local::now().format("%H:%M:%S").to_string();
        format!("[{}] [{}/{}] {}", timestamp, current, total, message)
    }

    pub fn log(current: usize, total: usize, message: &str, level: LogLevel) {
        let line = Self::format_wallet_line(current, total, message);
        let colored_line = match level {
            LogLevel::Debug => line.bright_black(),
            LogLevel::Success => line.green(),
            LogLevel::Warning => line.yellow(),
            LogLevel::Error => line.red(),
        };
        println!("{}", colored_line);
        Self::write_to_file(&format!("{}: [{}/{}] {}", level.label(), current, total, message));
    }

    pub fn header(title: &str) {
        println!("\n{}", "━".repeat(70).cyan());
        println!("{}", format!("  {}", title).cyan().bold());
        println!("{}\n", "━".repeat(70).cyan());
        Self::write_to_file(&format!("HEADER: {}", title));
    }

    pub fn info(message: &str) {
        println!("{} {}", "ℹ".blue(), message);
        Self::write_to_file(&format!("INFO: {}", message));
    }

    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
        Self::write_to_file(&format!("SUCCESS: {}", message));
    }

    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
        Self::write_to_file(&format!("WARNING: {}", message));
    }

    pub fn error(message: &str) {
        println!("{} {}", "✗".red(), message);
        Self::write_to_file(&format!("ERROR: {}", message));
    }

    pub fn startup(wallets: &[String], profile_name: &str, endpoints: &[String]) {
        println!("\n{}", "━".repeat(70).cyan());
        println!("{}", "  🌾 0G NEWTON SWAP FARMER".cyan().bold());
        println!("{}", "━".repeat(70).cyan());
        println!("{}", format!("   Profile: {}", profile_name).bright_black());
        for endpoint in endpoints {
            println!("{}", format!("   RPC:     {}", endpoint).bright_black());
        }
        println!("{}", "\n💼 Wallets:".cyan());
        for (index, address) in wallets.iter().enumerate() {
            println!("{}", format!("   {}. {}", index + 1, Self::mask_address(address)).bright_black());
        }
        println!();
        Self::write_to_file(&format!(
            "STARTUP: profile={} wallets={} endpoints={}",
            profile_name,
            wallets.len(),
            endpoints.len()
        ));
    }

    pub fn separator() {
        println!("{}", "─".repeat(85).bright_black());
    }
}
