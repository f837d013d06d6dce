//! # Evidoc CLI
//!
//! Usage:
//!   evidoc report.json -o report.pdf
//!   echo '{ ... }' | evidoc
//!   evidoc --example > report.json
//!
//! Without `-o` the output lands next to the working directory under a
//! timestamped name, the same shape the browser widget downloads as.

use std::env;
use std::fs;
use std::io::{self, Read};
use std::time::{SystemTime, UNIX_EPOCH};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--example") {
        print!("{}", example_report_json());
        return;
    }

    let input = if args.len() > 1 && !args[1].starts_with('-') {
        fs::read_to_string(&args[1]).expect("Failed to read input file")
    } else {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .expect("Failed to read stdin");
        buf
    };

    let output_path = args
        .windows(2)
        .find(|w| w[0] == "-o")
        .map(|w| w[1].clone())
        .unwrap_or_else(default_output_name);

    match evidoc::render_json(&input) {
        Ok(pdf_bytes) => {
            fs::write(&output_path, &pdf_bytes).expect("Failed to write PDF");
            eprintln!("✓ Written {} bytes to {}", pdf_bytes.len(), output_path);
        }
        Err(e) => {
            eprintln!("✗ Export failed: {}", e);
            std::process::exit(1);
        }
    }
}

/// `evidence-<millis>.pdf`, matching the widget's download name.
fn default_output_name() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    format!("evidence-{}.pdf", millis)
}

fn example_report_json() -> &'static str {
    r##"{
  "metadata": {
    "title": "Release 2.4 evidence",
    "author": "QA"
  },
  "page": {
    "size": "A4",
    "margin": 40
  },
  "scenarios": [
    {
      "applicationName": "Checkout",
      "appType": "frontend",
      "url": "https://shop.example/cart",
      "title": "Coupon applies at checkout",
      "description": "Apply the SPRING24 coupon on the cart page and verify the discounted total is shown before payment.",
      "screenshotsBefore": [],
      "screenshotsAfter": [],
      "observations": "Total updates without a reload."
    },
    {
      "applicationName": "Orders API",
      "appType": "backend",
      "url": "https://api.example/orders",
      "title": "Order rejected when stock is zero",
      "description": "POST an order for a sold-out SKU.",
      "requestBody": "POST /orders\n{ \"sku\": \"X-204\", \"qty\": 1 }",
      "responseBody": "409 Conflict\n{ \"error\": \"out_of_stock\" }",
      "observations": "Matches the documented error contract."
    }
  ]
}"##
}
