use crate::enums::ChainId;

/// Contract addresses deployed on a chain. Only the home chain hosts the
/// USDC pool and its router.
#[derive(Debug, Clone, Copy)]
pub struct Deployment {
    pub token: &'static str,
    pub usdc: Option<&'static str>,
    pub pool: Option<&'static str>,
    pub router: Option<&'static str>,
}

pub fn deployment(chain: ChainId) -> Deployment {
    match chain {
        ChainId::Base =>
            Deployment {
                token: "0x24460D2b3d96ee5Ce87EE401b1cf2FD01545d9b1",
                usdc: Some("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"),
                pool: Some("0x82dbc912599EfDa0F1FDC6e2A13c3843EC48662d"),
                router: Some("0x34d2C23dC8C51D26D26BCc37608Cf5638Ac7ca2c"),
            },
        ChainId::BaseSepolia =>
            Deployment {
                token: "0xe2C6D205F0EF4A215B66B25437BbC5C8d59525FE",
                usdc: None,
                pool: None,
                router: None,
            },
        ChainId::TaikoHekla =>
            Deployment {
                token: "0x53c04d5FC9F8d5c4f3C45B4da6617868ECEaF636",
                usdc: None,
                pool: None,
                router: None,
            },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains::evm::wallet::validate_address;

    #[test]
    fn test_every_deployment_address_is_valid() {
        for &chain in ChainId::all() {
            let d = deployment(chain);
            assert!(validate_address(d.token), "{} token", chain);
            for address in [d.usdc, d.pool, d.router].into_iter().flatten() {
                assert!(validate_address(address), "{} {}", chain, address);
            }
        }
        assert!(deployment(ChainId::Base).pool.is_some());
        assert!(deployment(ChainId::TaikoHekla).router.is_none());
    }
}
