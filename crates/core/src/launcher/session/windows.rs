//! Terminal Services / userenv binding of [`SessionApi`].

use std::ffi::c_void;
use std::io;
use std::os::windows::prelude::OsStrExt;
use std::{mem, ptr, slice};

use tracing::debug;
use windows_sys::Win32::Foundation::{CloseHandle, HANDLE};
use windows_sys::Win32::Security::{DuplicateTokenEx, SecurityImpersonation, TOKEN_ALL_ACCESS, TokenPrimary};
use windows_sys::Win32::System::Environment::{CreateEnvironmentBlock, DestroyEnvironmentBlock};
use windows_sys::Win32::System::RemoteDesktop::{
	WTS_CURRENT_SERVER_HANDLE, WTS_SESSION_INFOW, WTSActive, WTSEnumerateSessionsW, WTSFreeMemory, WTSQueryUserToken,
};
use windows_sys::Win32::System::Threading::{
	CREATE_NEW_CONSOLE, CREATE_UNICODE_ENVIRONMENT, CreateProcessAsUserW, PROCESS_INFORMATION, STARTF_USESHOWWINDOW, STARTUPINFOW,
};
use windows_sys::Win32::UI::WindowsAndMessaging::SW_SHOW;

use super::{SessionApi, SessionHandle};

/// Window station and desktop of the interactive user.
const INTERACTIVE_DESKTOP: &str = "winsta0\\default";

/// [`SessionApi`] over `wtsapi32`, `advapi32` and `userenv`.
///
/// Requires the caller to hold `SeTcbPrivilege`, which services running as
/// LocalSystem have.
#[derive(Debug, Clone, Copy, Default)]
pub struct WtsSessionApi;

/// Frees a `WTSEnumerateSessionsW` buffer on drop.
struct WtsMemory(*mut WTS_SESSION_INFOW);

impl Drop for WtsMemory {
	fn drop(&mut self) {
		if !self.0.is_null() {
			unsafe { WTSFreeMemory(self.0 as *mut c_void) };
		}
	}
}

/// Closes a process or thread handle on drop. Closing does not terminate.
struct OwnedHandle(HANDLE);

impl Drop for OwnedHandle {
	fn drop(&mut self) {
		if !self.0.is_null() {
			unsafe { CloseHandle(self.0) };
		}
	}
}

impl SessionApi for WtsSessionApi {
	type Token = HANDLE;
	type Environment = *mut c_void;

	fn enumerate_sessions(&self) -> io::Result<Vec<SessionHandle>> {
		let mut info: *mut WTS_SESSION_INFOW = ptr::null_mut();
		let mut count: u32 = 0;
		let ok = unsafe { WTSEnumerateSessionsW(WTS_CURRENT_SERVER_HANDLE, 0, 1, &mut info, &mut count) };
		if ok == 0 {
			return Err(io::Error::last_os_error());
		}
		let buffer = WtsMemory(info);

		let entries = if buffer.0.is_null() || count == 0 {
			&[][..]
		} else {
			unsafe { slice::from_raw_parts(buffer.0, count as usize) }
		};
		let sessions = entries
			.iter()
			.map(|entry| SessionHandle {
				session_id: entry.SessionId,
				is_active: entry.State == WTSActive,
			})
			.collect();
		debug!(target = "openwith.session", count, "enumerated sessions");
		Ok(sessions)
	}

	fn query_user_token(&self, session_id: u32) -> io::Result<HANDLE> {
		let mut token: HANDLE = ptr::null_mut();
		let ok = unsafe { WTSQueryUserToken(session_id, &mut token) };
		if ok == 0 {
			return Err(io::Error::last_os_error());
		}
		Ok(token)
	}

	fn duplicate_primary_token(&self, token: HANDLE) -> io::Result<HANDLE> {
		let mut primary: HANDLE = ptr::null_mut();
		let ok = unsafe { DuplicateTokenEx(token, TOKEN_ALL_ACCESS, ptr::null(), SecurityImpersonation, TokenPrimary, &mut primary) };
		if ok == 0 {
			return Err(io::Error::last_os_error());
		}
		Ok(primary)
	}

	fn create_environment_block(&self, token: HANDLE) -> io::Result<*mut c_void> {
		let mut environment: *mut c_void = ptr::null_mut();
		let ok = unsafe { CreateEnvironmentBlock(&mut environment, token, 0) };
		if ok == 0 {
			return Err(io::Error::last_os_error());
		}
		Ok(environment)
	}

	fn create_process(&self, token: HANDLE, environment: *mut c_void, session_id: u32, command_line: &str) -> io::Result<u32> {
		// CreateProcessAsUserW may write into the command line buffer.
		let mut command_line = to_wide(command_line);
		let mut desktop = to_wide(INTERACTIVE_DESKTOP);

		let mut startup: STARTUPINFOW = unsafe { mem::zeroed() };
		startup.cb = mem::size_of::<STARTUPINFOW>() as u32;
		startup.lpDesktop = desktop.as_mut_ptr();
		startup.dwFlags = STARTF_USESHOWWINDOW;
		startup.wShowWindow = SW_SHOW as u16;

		let mut process: PROCESS_INFORMATION = unsafe { mem::zeroed() };
		let ok = unsafe {
			CreateProcessAsUserW(
				token,
				ptr::null(),
				command_line.as_mut_ptr(),
				ptr::null(),
				ptr::null(),
				0,
				CREATE_UNICODE_ENVIRONMENT | CREATE_NEW_CONSOLE,
				environment,
				ptr::null(),
				&startup,
				&mut process,
			)
		};
		if ok == 0 {
			return Err(io::Error::last_os_error());
		}

		drop(OwnedHandle(process.hThread));
		drop(OwnedHandle(process.hProcess));
		debug!(target = "openwith.session", session_id, pid = process.dwProcessId, "process and thread handles closed");
		Ok(process.dwProcessId)
	}

	fn close_token(&self, token: HANDLE) {
		if !token.is_null() {
			unsafe { CloseHandle(token) };
		}
	}

	fn destroy_environment_block(&self, environment: *mut c_void) {
		if !environment.is_null() {
			unsafe { DestroyEnvironmentBlock(environment) };
		}
	}
}

fn to_wide(s: &str) -> Vec<u16> {
	std::ffi::OsStr::new(s).encode_wide().chain(std::iter::once(0)).collect()
}
