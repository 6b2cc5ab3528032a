use std::io::Write;

use tokio::io::{self, AsyncBufReadExt, BufReader};

use dosfs::{Output, Shell};

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

pub async fn run(shell: &mut Shell) -> dosfs::Result<()> {
    println!(
        "{} {}. Type 'help' for commands, 'exit' to quit.\n",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );
    let stdin = BufReader::new(io::stdin());
    let mut lines = stdin.lines();

    loop {
        print!("{} ", shell.prompt());
        std::io::stdout().flush().ok();

        let Some(line) = (match lines.next_line().await {
            Ok(v) => v,
            Err(e) => {
                println!("Error reading input: {}", e);
                break;
            }
        }) else {
            println!();
            break;
        };

        if matches!(line.trim().to_lowercase().as_str(), "exit" | "quit") {
            break;
        }

        // The terminal already shows what was typed after the prompt.
        render(&shell.execute(&line), true);
    }

    Ok(())
}

pub fn render(output: &Output, skip_echo: bool) {
    if output.clear {
        print!("{CLEAR_SCREEN}");
    }
    let skip = usize::from(skip_echo && !output.clear && !output.lines.is_empty());
    for line in &output.lines[skip..] {
        println!("{line}");
    }
    std::io::stdout().flush().ok();
}
