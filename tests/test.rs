#[cfg(test)]
mod macro_tests {

    /// awaits an async function, for easier usage in sync tests. Requires the `tokio_test` dependency.
    macro_rules! aw {
        ($e:expr) => {
            tokio_test::block_on($e)
        };
    }

    #[test]
    fn ghctl_trace_time_does_not_modify_function_results_in_sync_functions() {
        use ghctl_lib::ghctl_trace_time;

        #[ghctl_trace_time]
        fn traced_function(string: &str) -> usize {
            string.len()
        }

        fn non_traced_function(string: &str) -> usize {
            string.len()
        }

        let dummy_input = "this is a dummy input";
        assert_eq!(traced_function(dummy_input), non_traced_function(dummy_input))
    }

    #[test]
    fn ghctl_trace_time_does_not_modify_function_results_in_async_functions() {
        use ghctl_lib::ghctl_trace_time;

        #[ghctl_trace_time]
        async fn traced_function(string: &str) -> usize {
            string.len()
        }

        async fn non_traced_function(string: &str) -> usize {
            string.len()
        }

        let dummy_input = "this is a dummy input";

        assert_eq!(aw!(traced_function(dummy_input)), aw!(non_traced_function(dummy_input)));
    }

    #[test]
    fn ghctl_trace_time_keeps_early_returns_inside_the_traced_function() {
        use ghctl_lib::ghctl_trace_time;

        #[ghctl_trace_time]
        async fn traced_function(page: &str) -> Result<u32, std::num::ParseIntError> {
            let page = page.parse::<u32>()?;
            if page == 0 {
                return Ok(1);
            }
            Ok(page)
        }

        assert_eq!(aw!(traced_function("0")), Ok(1));
        assert_eq!(aw!(traced_function("7")), Ok(7));
        assert!(aw!(traced_function("seven")).is_err());
    }

    #[test]
    fn ghctl_trace_time_supports_unit_functions() {
        use ghctl_lib::ghctl_trace_time;

        #[ghctl_trace_time]
        fn traced_function(counter: &mut u32) {
            *counter += 1;
        }

        let mut counter = 0;
        traced_function(&mut counter);
        assert_eq!(counter, 1);
    }
}
