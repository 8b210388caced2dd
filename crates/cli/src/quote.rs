use color_eyre::eyre::{self, OptionExt as _, bail};
use kata_core::{
    catalog::{Catalog, Token},
    validate::{AmountValidation, DEFAULT_AMOUNT, SwapForm},
};
use tracing::debug;

#[derive(clap::Args, Debug)]
pub(crate) struct Quote {
    /// Token to convert from
    #[arg(long)]
    pub from: String,

    /// Token to convert to
    #[arg(long)]
    pub to: String,

    /// Amount of `from`, at most 6 fractional digits
    #[arg(long, default_value = DEFAULT_AMOUNT)]
    pub amount: String,
}

impl Quote {
    pub(crate) fn run(&self, catalog: &Catalog) -> eyre::Result<()> {
        let form = self.fill_form(catalog)?;
        debug!(?form, "filled swap form");

        if let Some(err) = form.error() {
            bail!("{err}");
        }
        println!("{}", form.summary());

        Ok(())
    }

    fn fill_form(&self, catalog: &Catalog) -> eyre::Result<SwapForm> {
        let mut form = SwapForm::default();

        if form.set_amount(&self.amount) == AmountValidation::Rejected {
            bail!(
                "amount '{}' must be a decimal in range with at most 6 fractional digits",
                self.amount
            );
        }

        form.select_from(lookup(catalog, &self.from)?);
        form.select_to(lookup(catalog, &self.to)?);

        Ok(form)
    }
}

fn lookup(catalog: &Catalog, name: &str) -> eyre::Result<Token> {
    if catalog.is_empty() {
        bail!("token catalog is empty, check the logs for load errors");
    }
    catalog
        .find(name)
        .cloned()
        .ok_or_eyre(format!("token '{name}' has no price in the catalog"))
}

#[cfg(test)]
mod tests {
    use kata_core::{
        catalog::{IconEntry, PriceQuote, build_catalog},
        validate::{Summary, ValidationError},
    };

    use super::*;

    fn catalog() -> Catalog {
        build_catalog(
            vec![
                IconEntry::new("ATOM.svg", "https://icons.test/ATOM.svg"),
                IconEntry::new("OSMO.svg", "https://icons.test/OSMO.svg"),
            ],
            vec![quote_of("ATOM", "2"), quote_of("OSMO", "4")],
            ".svg",
        )
    }

    fn quote_of(currency: &str, price: &str) -> PriceQuote {
        PriceQuote {
            currency: currency.to_string(),
            observed_at: "2023-08-29T07:10:40.000Z".parse().unwrap(),
            price: kata_core::rate::parse_amount(price).unwrap(),
        }
    }

    fn quote(from: &str, to: &str, amount: &str) -> Quote {
        Quote {
            from: from.to_string(),
            to: to.to_string(),
            amount: amount.to_string(),
        }
    }

    #[test]
    fn fills_form_from_catalog() {
        let form = quote("atom", "OSMO", "10").fill_form(&catalog()).unwrap();
        assert_eq!(form.error(), None);
        let Summary::Quote(result) = form.summary() else {
            panic!("expected a quote");
        };
        assert_eq!(
            result.to_string(),
            "10 ATOM =\n5.000000 OSMO\n1 ATOM = 0.500000 OSMO\n1 OSMO = 2.000000 ATOM"
        );
    }

    #[test]
    fn same_token_is_reported() {
        let form = quote("ATOM", "atom", "1").fill_form(&catalog()).unwrap();
        assert_eq!(form.error(), Some(ValidationError::SameToken));
        let err = quote("ATOM", "atom", "1").run(&catalog()).unwrap_err();
        assert_eq!(err.to_string(), "Please select different tokens");
    }

    #[test]
    fn rejected_amount_is_an_error() {
        let err = quote("ATOM", "OSMO", "1.1234567").run(&catalog()).unwrap_err();
        assert!(err.to_string().contains("at most 6 fractional digits"));

        let err = quote("ATOM", "OSMO", "100000000000000000000000000000")
            .run(&catalog())
            .unwrap_err();
        assert!(err.to_string().contains("in range"));
    }

    #[test]
    fn unknown_token_is_an_error() {
        let err = quote("ATOM", "XYZ", "1").run(&catalog()).unwrap_err();
        assert_eq!(err.to_string(), "token 'XYZ' has no price in the catalog");

        let err = quote("ATOM", "OSMO", "1").run(&Catalog::default()).unwrap_err();
        assert!(err.to_string().contains("catalog is empty"));
    }
}
