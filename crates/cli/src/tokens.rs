use color_eyre::eyre;
use kata_core::catalog::{Catalog, Token};

#[derive(clap::Args, Debug)]
pub(crate) struct Tokens {
    /// Only print token names
    #[arg(long)]
    pub names_only: bool,
}

impl Tokens {
    pub(crate) fn run(&self, catalog: &Catalog) -> eyre::Result<()> {
        if catalog.is_empty() {
            println!("No tokens available");
            return Ok(());
        }

        for token in catalog {
            println!("{}", self.render(token));
        }
        println!("Loaded {} tokens", catalog.len());

        Ok(())
    }

    fn render(&self, token: &Token) -> String {
        if self.names_only {
            return token.display_name();
        }
        let price = token
            .price()
            .map(|p| p.normalize().to_string())
            .unwrap_or_else(|| "-".to_string());
        format!("{:<12} {:>24} USD  {}", token.display_name(), price, token.icon_url())
    }
}
