//! Address block extraction with recipient → issuer fallback.

use tracing::debug;

use crate::document::{resolve, resolve_text, Node};
use crate::models::record::AddressFields;

/// Recipient address block, relative to the header block.
pub const RECIPIENT_ADDRESS: &str = "dest.enderDest";

/// Issuer address block, relative to the header block.
pub const ISSUER_ADDRESS: &str = "emit.enderEmit";

/// Read the seven address fields from one `ender*` block.
///
/// A missing block, or a block that is not a mapping, yields an empty address.
pub fn read_address(block: Option<&Node>) -> AddressFields {
    let Some(block) = block else {
        return AddressFields::default();
    };
    let field = |name: &str| resolve_text(block, name).to_string();

    AddressFields {
        street: field("xLgr"),
        number: field("nro"),
        district: field("xBairro"),
        city: field("xMun"),
        state: field("UF"),
        zip: field("CEP"),
        country: field("xPais"),
    }
}

/// Extract the address for the `dest_*` columns from a header block.
///
/// Uses the recipient address, unless every one of its fields is empty, in
/// which case the issuer address replaces it as a whole.
pub fn extract_address(info: &Node) -> AddressFields {
    let recipient = read_address(resolve(info, RECIPIENT_ADDRESS));
    if !recipient.is_empty() {
        return recipient;
    }

    debug!("recipient address empty, using issuer address");
    read_address(resolve(info, ISSUER_ADDRESS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse;
    use pretty_assertions::assert_eq;

    fn info(xml: &str) -> Node {
        let tree = parse(xml.as_bytes()).unwrap();
        resolve(&tree, "infNFe").cloned().unwrap()
    }

    const ISSUER: &str = "<emit><xNome>ACME</xNome><enderEmit>\
        <xLgr>Av. Paulista</xLgr><nro>1000</nro><xBairro>Bela Vista</xBairro>\
        <xMun>Sao Paulo</xMun><UF>SP</UF><CEP>01310100</CEP><xPais>Brasil</xPais>\
        </enderEmit></emit>";

    fn issuer_address() -> AddressFields {
        AddressFields {
            street: "Av. Paulista".to_string(),
            number: "1000".to_string(),
            district: "Bela Vista".to_string(),
            city: "Sao Paulo".to_string(),
            state: "SP".to_string(),
            zip: "01310100".to_string(),
            country: "Brasil".to_string(),
        }
    }

    #[test]
    fn test_recipient_address_preferred() {
        let info = info(&format!(
            "<infNFe>{ISSUER}<dest><enderDest><xLgr>Rua B</xLgr><xMun>Recife</xMun></enderDest></dest></infNFe>"
        ));

        let address = extract_address(&info);
        assert_eq!(address.street, "Rua B");
        assert_eq!(address.city, "Recife");
        // No per-field merge with the issuer block.
        assert_eq!(address.number, "");
        assert_eq!(address.country, "");
    }

    #[test]
    fn test_missing_recipient_falls_back_to_issuer() {
        let info = info(&format!("<infNFe>{ISSUER}<dest><xNome>X</xNome></dest></infNFe>"));
        assert_eq!(extract_address(&info), issuer_address());
    }

    #[test]
    fn test_all_empty_recipient_falls_back_to_issuer() {
        let info = info(&format!(
            "<infNFe>{ISSUER}<dest><enderDest><xLgr/><nro></nro><xMun>  </xMun></enderDest></dest></infNFe>"
        ));
        assert_eq!(extract_address(&info), issuer_address());
    }

    #[test]
    fn test_fallback_matches_direct_issuer_read() {
        let info = info(&format!("<infNFe>{ISSUER}</infNFe>"));
        assert_eq!(
            extract_address(&info),
            read_address(resolve(&info, ISSUER_ADDRESS))
        );
    }

    #[test]
    fn test_both_blocks_absent() {
        let info = info("<infNFe><emit><xNome>A</xNome></emit></infNFe>");
        assert_eq!(extract_address(&info), AddressFields::default());
    }

    #[test]
    fn test_non_mapping_block_reads_as_empty() {
        let info = info("<infNFe><dest><enderDest>text</enderDest></dest></infNFe>");
        assert_eq!(extract_address(&info), AddressFields::default());
    }
}
