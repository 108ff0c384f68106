use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, FnArg, ItemFn, Pat};

/// Time a system when the `perf_stats` feature is enabled.
///
/// The function body is wrapped in a guard that logs the elapsed time when the
/// guard drops. Without the feature the guard is compiled out entirely.
///
/// A parameter named `tick` whose type mentions `SimTick` is picked up
/// automatically; in that case the timing is also logged every 100 ticks,
/// not only when the threshold is exceeded.
///
/// ```ignore
/// #[profile]
/// pub fn rebuild_chunk_index(
///     mut index: ResMut<ChunkIndex>,
///     tick: Res<SimTick>,
/// ) {
///     // ...
/// }
///
/// #[profile(4)] // log above 4 ms instead of the default 1 ms
/// pub fn solve_flow_fields() { }
/// ```
#[proc_macro_attribute]
pub fn profile(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);

    let threshold_ms: u128 = if attr.is_empty() {
        1
    } else {
        attr.to_string().trim().parse().unwrap_or(1)
    };

    let attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &input.sig;
    let block = &input.block;
    let name = sig.ident.to_string();

    let tick_expr = if takes_sim_tick(&input) {
        quote! { Some(tick.0) }
    } else {
        quote! { None }
    };

    let output = quote! {
        #(#attrs)*
        #vis #sig {
            #[cfg(feature = "perf_stats")]
            let _profile_guard = {
                struct SystemTimer {
                    name: &'static str,
                    start: std::time::Instant,
                    tick: Option<u64>,
                }
                impl Drop for SystemTimer {
                    fn drop(&mut self) {
                        let elapsed = self.start.elapsed();
                        let periodic = self.tick.map_or(false, |t| t % 100 == 0);
                        if elapsed.as_millis() > #threshold_ms || periodic {
                            bevy::prelude::info!("[PERF] {}: {:?}", self.name, elapsed);
                        }
                    }
                }
                SystemTimer {
                    name: #name,
                    start: std::time::Instant::now(),
                    tick: #tick_expr,
                }
            };

            #block
        }
    };

    output.into()
}

fn takes_sim_tick(input: &ItemFn) -> bool {
    input.sig.inputs.iter().any(|arg| {
        let FnArg::Typed(pat_type) = arg else {
            return false;
        };
        let Pat::Ident(ident) = &*pat_type.pat else {
            return false;
        };
        let ty = &pat_type.ty;
        ident.ident == "tick" && quote!(#ty).to_string().contains("SimTick")
    })
}
