pub use crate::app::WallCliApp;

mod app {
    use anyhow::Result;
    use std::io::{self, BufRead, Write};
    use wallstudio_core::*;

    pub struct WallCliApp {
        config: Config,
        services: Services,
    }

    impl WallCliApp {
        pub fn new() -> Result<Self> {
            let config = Config::new()?;
            let services = Services::from_config(&config);

            Ok(Self { config, services })
        }

        pub fn print_config(&self) {
            println!("Config dir:   {}", self.config.config_dir.display());
            println!("Settings:     {}", self.config.settings_file.display());
            println!("Staging dir:  {}", self.config.staging_dir.display());
            println!("Library dir:  {}", self.config.library_dir.display());
            println!("Album:        {}", self.config.settings.album);
            println!(
                "Pexels key:   {}",
                if self.config.settings.pexels_api_key.is_empty() { "(missing)" } else { "set" }
            );
            println!(
                "Gemini key:   {}",
                if self.config.settings.gemini_api_key.is_empty() { "(missing)" } else { "set" }
            );
        }

        pub fn run_gallery(&mut self, query: Option<String>) -> Result<()> {
            let mut gallery = GalleryScreen::new(self.services.clone());
            if let Some(query) = query {
                gallery = gallery.with_query(query);
            }
            let mut gallery = gallery.start();

            println!("Loading wallpapers...");
            gallery.wait();
            print_alerts(gallery.take_alerts());

            loop {
                show_gallery_menu(&gallery);
                let Some(input) = read_line(&mut io::stdin().lock())? else {
                    println!();
                    break;
                };

                match input.trim() {
                    "r" => {
                        if report(gallery.refresh()) {
                            println!("Loading wallpapers...");
                            gallery.wait();
                        }
                    }
                    "f" => match gallery.toggle_full_screen() {
                        Ok(true) => {
                            if let Some(selection) = gallery.selection() {
                                let url = selection.candidate.display_url().to_string();
                                if let Err(e) = open::that(&url) {
                                    log::error!("Failed to open preview {}: {}", url, e);
                                }
                            }
                        }
                        Ok(false) => println!("Full screen preview closed"),
                        Err(e) => println!("{}", e),
                    },
                    "s" => {
                        if report(gallery.save()) {
                            println!("Saving...");
                            gallery.wait();
                        }
                    }
                    "c" => {
                        report(gallery.close());
                    }
                    "q" => {
                        println!("Exiting gallery...");
                        break;
                    }
                    other => match other.parse::<usize>() {
                        Ok(number) if number > 0 => {
                            report(gallery.select(number - 1));
                        }
                        _ => println!("Invalid option."),
                    },
                }

                gallery.poll();
                print_alerts(gallery.take_alerts());
            }

            Ok(())
        }

        pub fn run_generator(&mut self, prompt: Option<String>) -> Result<()> {
            let mut generator = GeneratorScreen::open(self.services.clone());
            print_alerts(generator.take_alerts());

            if let Some(prompt) = prompt {
                report(generator.set_prompt(prompt));
                self.generate(&mut generator);
            }

            loop {
                show_generator_menu(&generator);
                let Some(input) = read_line(&mut io::stdin().lock())? else {
                    println!();
                    break;
                };

                match input.trim() {
                    "p" => {
                        print!("What kind of wallpaper do you want? ");
                        io::stdout().flush()?;
                        let Some(prompt) = read_line(&mut io::stdin().lock())? else {
                            println!();
                            break;
                        };
                        report(generator.set_prompt(prompt.trim()));
                    }
                    "g" => self.generate(&mut generator),
                    "s" => {
                        if report(generator.save()) {
                            println!("Saving...");
                            generator.wait();
                        }
                    }
                    "q" => {
                        println!("Exiting generator...");
                        break;
                    }
                    _ => println!("Invalid option."),
                }

                generator.poll();
                print_alerts(generator.take_alerts());
            }

            Ok(())
        }

        fn generate(&self, generator: &mut GeneratorScreen) {
            if report(generator.generate()) {
                println!("Crafting your perfect wallpaper... This may take up to 30 seconds");
                generator.wait();
            }
            print_alerts(generator.take_alerts());
        }
    }

    fn show_gallery_menu(gallery: &GalleryScreen) {
        println!("\n=== Wallpapers: \"{}\" ===", gallery.query());
        for (index, candidate) in gallery.candidates().iter().enumerate() {
            let credit = candidate.photographer.as_deref().unwrap_or("unknown");
            println!(
                "{:>3}. #{} {}x{} by {}",
                index + 1,
                candidate.id,
                candidate.width,
                candidate.height,
                credit
            );
        }
        if let Some(error) = gallery.state().error() {
            println!("  ! {}", error);
        }

        if let Some(selection) = gallery.selection() {
            println!();
            println!("Selected #{} {}", selection.candidate.id, selection.candidate.display_url());
            println!(
                "f. {} full screen preview",
                if selection.full_screen { "Close" } else { "Open" }
            );
            if gallery.can_save() {
                println!("s. Save to Gallery");
            }
            println!("c. Cancel");
        } else {
            println!();
            println!("1-{}. Select wallpaper", gallery.candidates().len().max(1));
        }
        println!("r. Refresh");
        println!("q. Quit");
        print!("\nSelect an option: ");
        let _ = io::stdout().flush();
    }

    fn show_generator_menu(generator: &GeneratorScreen) {
        println!("\n=== Wallpaper Creator ===");
        let prompt = if generator.prompt().is_empty() { "(none)" } else { generator.prompt() };
        println!("Prompt: {}", prompt);
        match generator.image() {
            Some(image) => println!("Your wallpaper: {} ({} base64 chars)", image.mime_type, image.payload.len()),
            None => {
                if let Some(error) = generator.error() {
                    println!("  ! {}", error);
                }
            }
        }
        println!();
        println!("p. Enter prompt");
        println!("g. Generate Wallpaper");
        if generator.can_save() {
            println!("s. Save to Gallery");
        }
        println!("q. Quit");
        print!("\nSelect an option: ");
        let _ = io::stdout().flush();
    }

    /// Reads one line; `None` once input is closed.
    fn read_line(reader: &mut impl BufRead) -> Result<Option<String>> {
        let mut input = String::new();
        if reader.read_line(&mut input)? == 0 {
            return Ok(None);
        }
        Ok(Some(input))
    }

    /// Prints a rejected trigger; returns whether the trigger went through.
    fn report(result: std::result::Result<(), Rejected>) -> bool {
        match result {
            Ok(()) => true,
            Err(e) => {
                println!("{}", e);
                false
            }
        }
    }

    fn print_alert(alert: &Alert) {
        println!("[{}] {}", alert.title, alert.message);
    }

    fn print_alerts(alerts: Vec<Alert>) {
        for alert in &alerts {
            print_alert(alert);
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn read_line_stops_at_end_of_input() {
            let mut input: &[u8] = b"3\nq\n";
            assert_eq!(read_line(&mut input).unwrap().as_deref(), Some("3\n"));
            assert_eq!(read_line(&mut input).unwrap().as_deref(), Some("q\n"));
            assert_eq!(read_line(&mut input).unwrap(), None);
        }

        #[test]
        fn blank_line_is_not_end_of_input() {
            let mut input: &[u8] = b"\n";
            assert_eq!(read_line(&mut input).unwrap().as_deref(), Some("\n"));
            assert_eq!(read_line(&mut input).unwrap(), None);
        }
    }
}
