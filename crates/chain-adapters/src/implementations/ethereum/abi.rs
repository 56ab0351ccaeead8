//! ERC-20 ABI definitions using alloy's `sol!` macro.

use alloy::sol;

sol! {
	/// ERC-20 token interface; only the transfer call is encoded.
	interface IERC20 {
		function transfer(address to, uint256 amount) external returns (bool);
	}
}
