use ethers::abi::{ parse_abi, Abi };
use lazy_static::lazy_static;

lazy_static! {
    pub static ref ERC20_ABI: Abi = parse_abi(
        &[
            "function balanceOf(address account) external view returns (uint256)",
            "function allowance(address owner, address spender) external view returns (uint256)",
            "function totalSupply() external view returns (uint256)",
            "function decimals() external view returns (uint8)",
            "function symbol() external view returns (string)",
            "function approve(address spender, uint256 amount) external returns (bool)",
            "function transfer(address to, uint256 amount) external returns (bool)",
        ]
    ).expect("Failed to parse ERC20 ABI");

    /// ERC-20 plus the agent-gated bridge entry points.
    pub static ref BRIDGEABLE_TOKEN_ABI: Abi = parse_abi(
        &[
            "function balanceOf(address account) external view returns (uint256)",
            "function allowance(address owner, address spender) external view returns (uint256)",
            "function totalSupply() external view returns (uint256)",
            "function decimals() external view returns (uint8)",
            "function symbol() external view returns (string)",
            "function approve(address spender, uint256 amount) external returns (bool)",
            "function transfer(address to, uint256 amount) external returns (bool)",
            "function bridgeBurn(uint256 amount, uint256 targetChainId) external",
            "function verifyValueAPI(uint256 totalSupplyAllChains, uint256 bankBalance) external",
            "function mintTokens(address[] recipients, uint256[] amounts) external",
            "function burnTokens(uint256 amount, address user) external",
        ]
    ).expect("Failed to parse bridgeable token ABI");

    pub static ref POOL_ABI: Abi = parse_abi(
        &[
            "function balanceOf(address account) external view returns (uint256)",
            "function totalSupply() external view returns (uint256)",
            "function getReserves() external view returns (uint256, uint256)",
            "function investCLPDwithoutUSDC(uint256 amount) external",
            "function investUSDCwithoutCLPD(uint256 amount) external",
        ]
    ).expect("Failed to parse pool ABI");

    pub static ref ROUTER_ABI: Abi = parse_abi(
        &[
            "function swap(address tokenIn, address tokenOut, uint256 amountIn) external returns (uint256)",
            "function getAmountOut(uint256 amountIn, address tokenIn, address tokenOut) external view returns (uint256)",
            "function getPriceOfCLPDInUSDC() external view returns (uint256)",
            "function getPriceOfUSDCInCLPD() external view returns (uint256)",
        ]
    ).expect("Failed to parse router ABI");
}
